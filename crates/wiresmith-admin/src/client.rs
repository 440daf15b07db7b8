//! HTTP client for the stub server's `/__admin/mappings` API.

use crate::auth::Auth;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use wiresmith_core::Mapping;

/// Default bound on each Admin API request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAPPINGS_PATH: &str = "/__admin/mappings";

/// Operations the engine needs from a stub server's Admin API.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Create a mapping, returning it as stored by the server.
    async fn create(&self, base_url: &str, mapping: &Mapping, auth: &Auth)
        -> Result<Mapping, ApiError>;

    /// List every mapping on the server, including ones this crate did not
    /// generate.
    async fn list_all(&self, base_url: &str, auth: &Auth)
        -> Result<Vec<RemoteMapping>, ApiError>;

    /// Returns `false` when the server has no mapping with this id.
    async fn delete(&self, base_url: &str, id: &str, auth: &Auth) -> Result<bool, ApiError>;

    /// Remove every mapping on the server.
    async fn reset_all(&self, base_url: &str, auth: &Auth) -> Result<(), ApiError>;
}

/// A mapping as listed by the stub server.
///
/// Only the id is interpreted. Every other field is kept as raw JSON, so
/// matchers and methods outside the [`Mapping`] model survive a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RemoteMapping {
    pub fn from_mapping(mapping: &Mapping) -> Result<Self, serde_json::Error> {
        serde_json::to_value(mapping).and_then(serde_json::from_value)
    }
}

/// Response wrapper for mapping list
#[derive(Debug, Deserialize)]
struct MappingsResponse {
    #[serde(default)]
    mappings: Vec<RemoteMapping>,
}

/// Error response from the Admin API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// reqwest-backed [`AdminApi`].
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
}

impl AdminClient {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn send(&self, request: RequestBuilder, base_url: &str) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, base_url))
    }

    async fn handle_error<T>(&self, resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn create(
        &self,
        base_url: &str,
        mapping: &Mapping,
        auth: &Auth,
    ) -> Result<Mapping, ApiError> {
        let url = mappings_url(base_url);
        let request = auth.apply(self.client.post(&url).json(mapping));
        let resp = self.send(request, base_url).await?;

        if !resp.status().is_success() {
            return self.handle_error(resp).await;
        }

        let stored: Mapping = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        debug!(mapping_id = %stored.id, "Created remote mapping");
        Ok(stored)
    }

    async fn list_all(
        &self,
        base_url: &str,
        auth: &Auth,
    ) -> Result<Vec<RemoteMapping>, ApiError> {
        let url = mappings_url(base_url);
        let resp = self.send(auth.apply(self.client.get(&url)), base_url).await?;

        if !resp.status().is_success() {
            return self.handle_error(resp).await;
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(e, base_url))?;
        parse_listing(&body)
    }

    async fn delete(&self, base_url: &str, id: &str, auth: &Auth) -> Result<bool, ApiError> {
        let url = format!("{}/{}", mappings_url(base_url), id);
        let resp = self
            .send(auth.apply(self.client.delete(&url)), base_url)
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return self.handle_error(resp).await;
        }

        debug!(mapping_id = %id, "Deleted remote mapping");
        Ok(true)
    }

    async fn reset_all(&self, base_url: &str, auth: &Auth) -> Result<(), ApiError> {
        let url = format!("{}/reset", mappings_url(base_url));
        let resp = self.send(auth.apply(self.client.post(&url)), base_url).await?;

        if !resp.status().is_success() {
            return self.handle_error(resp).await;
        }

        Ok(())
    }
}

pub fn mappings_url(base_url: &str) -> String {
    format!("{}{MAPPINGS_PATH}", base_url.trim_end_matches('/'))
}

fn parse_listing(body: &[u8]) -> Result<Vec<RemoteMapping>, ApiError> {
    serde_json::from_slice::<MappingsResponse>(body)
        .map(|listing| listing.mappings)
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Pick the most useful message out of an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(detail) = parsed.errors.first() {
            if let Some(message) = detail.detail.as_ref().or(detail.title.as_ref()) {
                return message.clone();
            }
        }
    }
    if body.trim().is_empty() {
        format!("Request failed with status {status}")
    } else {
        body.trim().to_string()
    }
}
