//! Mapping store CRUD handlers.

use crate::api::state::AppState;
use crate::api::types::*;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::info;
use wiresmith_core::{Mapping, StoreError};

/// GET /mappings - List stored mappings in creation order
pub fn handle_list(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &ListMappingsResponse::new(state.store.list()))
}

/// POST /mappings - Store a single mapping
pub fn handle_create(body: &[u8], state: &AppState) -> Response<Full<Bytes>> {
    let mapping = match parse_mapping(body) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match state.store.create(mapping) {
        Ok(stored) => {
            info!(mapping_id = %stored.id, "Created mapping");
            json_response(StatusCode::CREATED, &stored)
        }
        Err(e @ StoreError::DuplicateId(_)) => error_response(StatusCode::CONFLICT, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// DELETE /mappings - Remove every stored mapping
pub fn handle_delete_all(state: &AppState) -> Response<Full<Bytes>> {
    let deleted = state.store.clear();
    info!(deleted, "Cleared mapping store");
    json_response(StatusCode::OK, &serde_json::json!({ "deleted": deleted }))
}

/// GET /mappings/:id
pub fn handle_get(id: &str, state: &AppState) -> Response<Full<Bytes>> {
    match state.store.get(id) {
        Some(mapping) => json_response(StatusCode::OK, &mapping),
        None => error_response(StatusCode::NOT_FOUND, &StoreError::NotFound(id.into()).to_string()),
    }
}

/// PUT /mappings/:id - Replace a stored mapping
pub fn handle_replace(id: &str, body: &[u8], state: &AppState) -> Response<Full<Bytes>> {
    let mapping = match parse_mapping(body) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match state.store.update(id, mapping) {
        Ok(stored) => json_response(StatusCode::OK, &stored),
        Err(e @ StoreError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

/// DELETE /mappings/:id
pub fn handle_delete(id: &str, state: &AppState) -> Response<Full<Bytes>> {
    if state.store.delete(id) {
        info!(mapping_id = %id, "Deleted mapping");
        json_response(StatusCode::OK, &serde_json::json!({ "deleted": true }))
    } else {
        error_response(StatusCode::NOT_FOUND, &StoreError::NotFound(id.into()).to_string())
    }
}

fn parse_mapping(body: &[u8]) -> Result<Mapping, Response<Full<Bytes>>> {
    serde_json::from_slice(body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("Invalid mapping JSON: {e}"),
        )
    })
}
