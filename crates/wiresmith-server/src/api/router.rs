//! Route dispatch logic for the HTTP API.

use crate::api::handlers::{deploy, documents, mappings, remote, system};
use crate::api::state::AppState;
use crate::api::types::{collect_body, error_response, not_found, source_format};
use crate::metrics::record_request;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

/// Parsed route for `/mappings/...`
#[derive(Debug, PartialEq, Eq)]
enum MappingRoute<'a> {
    /// GET/POST/DELETE /mappings
    Root,
    /// POST /mappings/deploy
    Deploy,
    /// GET/PUT/DELETE /mappings/:id
    ById(&'a str),
}

impl<'a> MappingRoute<'a> {
    /// Parse route from path segments after `/mappings`
    fn parse(segments: &[&'a str]) -> Option<Self> {
        match segments {
            [] | [""] => Some(MappingRoute::Root),
            ["deploy"] => Some(MappingRoute::Deploy),
            [id] if !id.is_empty() => Some(MappingRoute::ById(*id)),
            _ => None,
        }
    }
}

/// Parsed route for `/remote/...`
#[derive(Debug, PartialEq, Eq)]
enum RemoteRoute<'a> {
    /// GET /remote/mappings
    Mappings,
    /// DELETE /remote/mappings/:id
    MappingById(&'a str),
    /// POST /remote/reset
    Reset,
}

impl<'a> RemoteRoute<'a> {
    fn parse(segments: &[&'a str]) -> Option<Self> {
        match segments {
            ["mappings"] => Some(RemoteRoute::Mappings),
            ["mappings", id] if !id.is_empty() => Some(RemoteRoute::MappingById(*id)),
            ["reset"] => Some(RemoteRoute::Reset),
            _ => None,
        }
    }
}

/// Main request router
pub async fn route_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let format = source_format(req.headers());

    debug!("API: {} {}", method, path);

    let response = match collect_body(req.into_body()).await {
        Ok(body) => route_by_path(&method, &path, &body, format, &state).await,
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
    };

    record_request(method.as_str(), response.status().as_u16());
    Ok(response)
}

/// Route based on path
async fn route_by_path(
    method: &Method,
    path: &str,
    body: &[u8],
    format: wiresmith_core::SourceFormat,
    state: &AppState,
) -> Response<Full<Bytes>> {
    match (method, path) {
        (&Method::GET, "/health") => return system::handle_health(),
        (&Method::GET, "/metrics") => return system::handle_metrics(),
        (&Method::GET, "/schema") => return system::handle_schema(),
        (&Method::GET, "/template") => return system::handle_template(),
        (&Method::POST, "/validate") => return documents::handle_validate(body, format),
        (&Method::POST, "/generate") => return documents::handle_generate(body, format, state),
        (&Method::POST, "/deploy") => {
            return deploy::handle_deploy_document(body, format, state).await
        }
        _ => {}
    }

    if let Some(rest) = strip_collection(path, "/mappings") {
        let segments: Vec<&str> = rest.split('/').collect();
        return match MappingRoute::parse(&segments) {
            Some(route) => route_mappings(method, route, body, state).await,
            None => not_found(),
        };
    }

    if let Some(rest) = path.strip_prefix("/remote/") {
        let segments: Vec<&str> = rest.split('/').collect();
        return match (method, RemoteRoute::parse(&segments)) {
            (&Method::GET, Some(RemoteRoute::Mappings)) => remote::handle_list(state).await,
            (&Method::DELETE, Some(RemoteRoute::MappingById(id))) => {
                remote::handle_delete(id, state).await
            }
            (&Method::POST, Some(RemoteRoute::Reset)) => remote::handle_reset(state).await,
            _ => not_found(),
        };
    }

    not_found()
}

/// Route mapping store requests
async fn route_mappings(
    method: &Method,
    route: MappingRoute<'_>,
    body: &[u8],
    state: &AppState,
) -> Response<Full<Bytes>> {
    match (method, route) {
        (&Method::GET, MappingRoute::Root) => mappings::handle_list(state),
        (&Method::POST, MappingRoute::Root) => mappings::handle_create(body, state),
        (&Method::DELETE, MappingRoute::Root) => mappings::handle_delete_all(state),

        (&Method::POST, MappingRoute::Deploy) => deploy::handle_deploy_stored(state).await,

        (&Method::GET, MappingRoute::ById(id)) => mappings::handle_get(id, state),
        (&Method::PUT, MappingRoute::ById(id)) => mappings::handle_replace(id, body, state),
        (&Method::DELETE, MappingRoute::ById(id)) => mappings::handle_delete(id, state),

        _ => not_found(),
    }
}

/// `/mappings` and `/mappings/...`, but not `/mappingsfoo`.
fn strip_collection<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}
