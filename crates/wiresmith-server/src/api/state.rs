//! Shared state behind every request.

use crate::config::{Config, DeployConfig, TargetConfig};
use std::sync::Arc;
use wiresmith_admin::{AdminApi, ApiError, Auth};
use wiresmith_core::{MappingStore, Target};

/// A stub server to talk to, with resolved credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub base_url: String,
    pub auth: Auth,
}

impl ResolvedTarget {
    pub fn from_config(target: &TargetConfig) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: target.base_url.clone(),
            auth: resolve_auth(target.auth.as_ref())?,
        })
    }

    /// Target declared inside a document.
    pub fn from_document(target: &Target) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: target.base_url.clone(),
            auth: resolve_auth(target.auth.as_ref())?,
        })
    }
}

fn resolve_auth(spec: Option<&wiresmith_core::AuthSpec>) -> Result<Auth, ApiError> {
    spec.map(Auth::from_spec).transpose().map(Option::unwrap_or_default)
}

pub struct AppState {
    pub store: MappingStore,
    pub admin: Arc<dyn AdminApi>,
    pub target: Option<TargetConfig>,
    pub deploy: DeployConfig,
}

impl AppState {
    pub fn new(config: &Config, admin: Arc<dyn AdminApi>) -> Self {
        Self {
            store: MappingStore::new(),
            admin,
            target: config.target.clone(),
            deploy: config.deploy.clone(),
        }
    }

    /// The configured default target, if any.
    pub fn configured_target(&self) -> Option<Result<ResolvedTarget, ApiError>> {
        self.target.as_ref().map(ResolvedTarget::from_config)
    }
}
