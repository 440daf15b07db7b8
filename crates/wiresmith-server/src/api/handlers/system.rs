//! System handlers: health, metrics, schema, template.

use crate::api::types::*;
use crate::metrics::collect_metrics;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use wiresmith_core::schema::DOCUMENT_SCHEMA_JSON;
use wiresmith_core::sample_document;

/// GET /health - Health check
pub fn handle_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}))
}

/// GET /metrics - Prometheus metrics
pub fn handle_metrics() -> Response<Full<Bytes>> {
    build_response_with_headers(
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        collect_metrics(),
    )
}

/// GET /schema - The canonical document schema
pub fn handle_schema() -> Response<Full<Bytes>> {
    build_response_with_headers(
        StatusCode::OK,
        [("Content-Type", "application/json")],
        DOCUMENT_SCHEMA_JSON,
    )
}

/// GET /template - A starter document
pub fn handle_template() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &sample_document())
}
