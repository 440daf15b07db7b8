//! Admin API client for WireMock-style stub servers.
//!
//! Mappings produced by `wiresmith-core` are pushed to a running stub server
//! through its `/__admin/mappings` endpoints. [`AdminApi`] abstracts the
//! server so deployments can be exercised without one.

mod auth;
mod client;
mod deploy;
mod error;

pub use auth::Auth;
pub use client::{mappings_url, AdminApi, AdminClient, RemoteMapping, DEFAULT_TIMEOUT};
pub use deploy::{deploy, DeployFailure, DeployReport};
pub use error::ApiError;
