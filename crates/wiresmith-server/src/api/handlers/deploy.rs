//! Deployment handlers.

use crate::api::handlers::documents::generate_from_body;
use crate::api::state::{AppState, ResolvedTarget};
use crate::api::types::*;
use crate::metrics::record_deploy;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use wiresmith_admin::deploy;
use wiresmith_core::{Mapping, SourceFormat, ValidationError};

const NO_TARGET: &str = "No deployment target: set target.baseUrl in the document or configure one";

/// POST /deploy - Validate and transform a document, then push its mappings
pub async fn handle_deploy_document(
    body: &[u8],
    format: SourceFormat,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let generation = match generate_from_body(body, format) {
        Ok(generation) => generation,
        Err(result) => return invalid_document(&result),
    };

    let target = match generation.target.as_ref() {
        Some(target) => Some(ResolvedTarget::from_document(target)),
        None => state.configured_target(),
    };
    let target = match target {
        Some(Ok(target)) => target,
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        None => return error_response(StatusCode::BAD_REQUEST, NO_TARGET),
    };

    deploy_to(&target, &generation.mappings, generation.warnings, state).await
}

/// POST /mappings/deploy - Push every stored mapping to the configured target
pub async fn handle_deploy_stored(state: &AppState) -> Response<Full<Bytes>> {
    let target = match state.configured_target() {
        Some(Ok(target)) => target,
        Some(Err(e)) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        None => return error_response(StatusCode::BAD_REQUEST, NO_TARGET),
    };

    deploy_to(&target, &state.store.list(), Vec::new(), state).await
}

async fn deploy_to(
    target: &ResolvedTarget,
    mappings: &[Mapping],
    warnings: Vec<ValidationError>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let report = deploy(
        state.admin.as_ref(),
        &target.base_url,
        mappings,
        &target.auth,
        state.deploy.concurrency,
    )
    .await;
    record_deploy(&report);

    json_response(
        StatusCode::OK,
        &DeployResponse::new(&target.base_url, report, warnings),
    )
}
