//! Request/response types and helpers for the HTTP API.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{HeaderMap, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wiresmith_admin::DeployReport;
use wiresmith_core::{Mapping, SourceFormat, ValidationError, ValidationResult};

/// Response for listing mappings, local or remote
#[derive(Debug, Serialize, Deserialize)]
pub struct ListMappingsResponse<T = Mapping> {
    pub mappings: Vec<T>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMeta {
    pub total: usize,
}

impl<T> ListMappingsResponse<T> {
    pub fn new(mappings: Vec<T>) -> Self {
        let total = mappings.len();
        Self {
            mappings,
            meta: ListMeta { total },
        }
    }
}

/// Response for a successful generation
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub mappings: Vec<Mapping>,
    pub warnings: Vec<ValidationError>,
}

/// Response for a deployment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub target_url: String,
    pub success_count: usize,
    pub failure_count: usize,
    #[serde(flatten)]
    pub report: DeployReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationError>,
}

impl DeployResponse {
    pub fn new(target_url: &str, report: DeployReport, warnings: Vec<ValidationError>) -> Self {
        Self {
            target_url: target_url.to_string(),
            success_count: report.success_count(),
            failure_count: report.failure_count(),
            report,
            warnings,
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

/// Individual error detail
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

// =============================================================================
// Response helper functions
// =============================================================================

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

/// Build an HTTP response with headers.
///
/// Falls back to a bare response if the builder rejects the headers.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}

/// Create an error response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse {
        errors: vec![ErrorDetail {
            code: status.as_str().to_string(),
            message: message.to_string(),
        }],
    };
    json_response(status, &error)
}

/// Create a not found response
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// 422 carrying the full validation result.
pub fn invalid_document(result: &ValidationResult) -> Response<Full<Bytes>> {
    json_response(StatusCode::UNPROCESSABLE_ENTITY, result)
}

/// Collect request body into bytes
pub async fn collect_body<B>(body: B) -> Result<Bytes, String>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    body.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}

/// Documents are JSON unless the request says YAML.
pub fn source_format(headers: &HeaderMap) -> SourceFormat {
    let content_type = headers
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type.contains("yaml") {
        SourceFormat::Yaml
    } else {
        SourceFormat::Json
    }
}

/// Parse a document body. Unparseable input becomes a root-level validation
/// error, like any other invalid document.
pub fn parse_document(body: &[u8], format: SourceFormat) -> Result<Value, ValidationResult> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ValidationResult::root_error(format!("Body is not UTF-8: {e}")))?;
    format
        .parse(text)
        .map_err(|e| ValidationResult::root_error(e.to_string()))
}
