//! HTTP service around the wiresmith engine.
//!
//! Exposes validation, generation, an in-memory mapping store and deployment
//! to a stub server's Admin API over a small JSON API.

pub mod api;
pub mod config;
pub mod metrics;

pub use api::{route_request, ApiServer, AppState, ResolvedTarget};
pub use config::{Config, DeployConfig, ListenConfig, LogConfig, LogFormat, TargetConfig};
