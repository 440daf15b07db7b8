//! Pass-through handlers for the configured stub server's Admin API.

use crate::api::state::{AppState, ResolvedTarget};
use crate::api::types::*;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::{error, info};
use wiresmith_admin::ApiError;

/// GET /remote/mappings
pub async fn handle_list(state: &AppState) -> Response<Full<Bytes>> {
    let target = match require_target(state) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match state.admin.list_all(&target.base_url, &target.auth).await {
        Ok(mappings) => json_response(StatusCode::OK, &ListMappingsResponse::new(mappings)),
        Err(e) => upstream_error(&target, e),
    }
}

/// DELETE /remote/mappings/:id
pub async fn handle_delete(id: &str, state: &AppState) -> Response<Full<Bytes>> {
    let target = match require_target(state) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match state.admin.delete(&target.base_url, id, &target.auth).await {
        Ok(true) => {
            info!(mapping_id = %id, target_url = %target.base_url, "Deleted remote mapping");
            json_response(StatusCode::OK, &serde_json::json!({ "deleted": true }))
        }
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            &format!("Mapping not found on stub server: {id}"),
        ),
        Err(e) => upstream_error(&target, e),
    }
}

/// POST /remote/reset
pub async fn handle_reset(state: &AppState) -> Response<Full<Bytes>> {
    let target = match require_target(state) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match state.admin.reset_all(&target.base_url, &target.auth).await {
        Ok(()) => {
            info!(target_url = %target.base_url, "Reset remote mappings");
            json_response(StatusCode::OK, &serde_json::json!({ "reset": true }))
        }
        Err(e) => upstream_error(&target, e),
    }
}

fn require_target(state: &AppState) -> Result<ResolvedTarget, Response<Full<Bytes>>> {
    match state.configured_target() {
        Some(Ok(target)) => Ok(target),
        Some(Err(e)) => Err(error_response(StatusCode::BAD_REQUEST, &e.to_string())),
        None => Err(error_response(
            StatusCode::BAD_REQUEST,
            "No stub server configured",
        )),
    }
}

fn upstream_error(target: &ResolvedTarget, e: ApiError) -> Response<Full<Bytes>> {
    error!(target_url = %target.base_url, error = %e, "Admin API call failed");
    error_response(StatusCode::BAD_GATEWAY, &e.to_string())
}
