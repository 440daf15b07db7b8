//! HTTP JSON API for wiresmith.
//!
//! Endpoints cover:
//! - Document validation and mapping generation
//! - CRUD over the in-memory mapping store
//! - Deployment to a stub server's Admin API, and pass-through calls to it
//! - Health, metrics, schema and template endpoints

mod handlers;
mod router;
mod server;
mod state;
mod types;

pub use router::route_request;
pub use server::ApiServer;
pub use state::{AppState, ResolvedTarget};
pub use types::{DeployResponse, ErrorResponse, GenerateResponse, ListMappingsResponse};
