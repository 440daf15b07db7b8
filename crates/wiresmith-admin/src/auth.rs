//! Authentication for Admin API calls.

use crate::error::ApiError;
use base64::Engine;
use wiresmith_core::{AuthSpec, AuthType};

/// Credentials attached to every Admin API request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    None,
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl Auth {
    /// Build credentials from a document's auth block.
    ///
    /// Fails when the block lacks a field its type requires.
    pub fn from_spec(spec: &AuthSpec) -> Result<Self, ApiError> {
        let missing = spec.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::Auth(format!("missing {}", missing.join(", "))));
        }

        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(match spec.kind {
            AuthType::None => Auth::None,
            AuthType::Basic => Auth::Basic {
                username: field(&spec.username),
                password: field(&spec.password),
            },
            AuthType::Bearer => Auth::Bearer {
                token: field(&spec.token),
            },
        })
    }

    /// Value of the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Auth::None => None,
            Auth::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                Some(format!("Basic {encoded}"))
            }
            Auth::Bearer { token } => Some(format!("Bearer {token}")),
        }
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.header_value() {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        }
    }
}
