//! Document validation and generation handlers.

use crate::api::state::AppState;
use crate::api::types::*;
use crate::metrics::{record_generated, record_validation};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use wiresmith_core::{generate, validate_document, Generation, SourceFormat, ValidationResult};

/// POST /validate - Validate a document; always 200 with the result
pub fn handle_validate(body: &[u8], format: SourceFormat) -> Response<Full<Bytes>> {
    let result = match parse_document(body, format) {
        Ok(raw) => validate_document(&raw),
        Err(result) => result,
    };
    record_validation(result.is_valid);
    json_response(StatusCode::OK, &result)
}

/// POST /generate - Validate, transform and store the resulting mappings
pub fn handle_generate(
    body: &[u8],
    format: SourceFormat,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let generation = match generate_from_body(body, format) {
        Ok(generation) => generation,
        Err(result) => return invalid_document(&result),
    };

    // Legacy documents keep their own ids, which may already be stored.
    let stored = match state.store.create_all(generation.mappings) {
        Ok(stored) => stored,
        Err(e) => return error_response(StatusCode::CONFLICT, &e.to_string()),
    };

    json_response(
        StatusCode::OK,
        &GenerateResponse {
            mappings: stored,
            warnings: generation.warnings,
        },
    )
}

/// Parse, validate and transform a document body, recording metrics.
pub(crate) fn generate_from_body(
    body: &[u8],
    format: SourceFormat,
) -> Result<Generation, ValidationResult> {
    let raw = parse_document(body, format).inspect_err(|_| record_validation(false))?;
    let generation = generate(&raw);
    record_validation(generation.is_ok());
    if let Ok(generation) = &generation {
        record_generated(generation.mappings.len());
    }
    generation
}
