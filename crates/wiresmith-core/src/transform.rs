//! Mock-to-mapping transformation.
//!
//! Callers must only transform documents that passed validation. Items that
//! still cannot be converted are excluded from the output and reported as
//! failures; the rest of the batch is unaffected.

use crate::document::{
    BodyKind, BodyPatternSpec, Defaults, Document, LegacyDocument, LegacyMapping, Matcher,
    MockDocument, MockEntry, RequestSpec,
};
use crate::mapping::{
    BodyPattern, Mapping, MappingRequest, MappingResponse, ResponseBody, UrlMatcher,
    RESPONSE_TEMPLATE_TRANSFORMER,
};
use crate::path_template::{template_to_regex, TemplateError};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Status code {0} is not representable")]
    Status(i64),
}

/// An item excluded from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformFailure {
    /// Position of the item in `mocks` (or `mappings` for legacy documents).
    pub index: usize,
    pub message: String,
}

/// Mappings produced from one document, plus the items that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    pub mappings: Vec<Mapping>,
    pub failures: Vec<TransformFailure>,
}

/// Transform a validated document into mappings, in document order.
pub fn transform(document: &Document) -> Vec<Mapping> {
    transform_with_report(document).mappings
}

/// Transform a validated document, keeping track of excluded items.
pub fn transform_with_report(document: &Document) -> TransformReport {
    let mut ids = IdAllocator::default();
    let results: Vec<Result<Mapping, TransformError>> = match document {
        Document::Canonical(doc) => transform_mocks(doc, &mut ids),
        Document::Legacy(doc) => normalize_legacy(doc, &mut ids),
    };

    let mut report = TransformReport::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(mapping) => report.mappings.push(mapping),
            Err(e) => {
                warn!(index, error = %e, "Skipping item that cannot be transformed");
                report.failures.push(TransformFailure {
                    index,
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(
        dialect = %document.dialect(),
        mappings = report.mappings.len(),
        failures = report.failures.len(),
        "Transformed document"
    );
    report
}

fn transform_mocks(
    document: &MockDocument,
    ids: &mut IdAllocator,
) -> Vec<Result<Mapping, TransformError>> {
    document
        .mocks
        .iter()
        .map(|mock| transform_mock(mock, document.defaults.as_ref(), ids.fresh()))
        .collect()
}

/// Merge document defaults into one mock and emit its mapping.
pub fn transform_mock(
    mock: &MockEntry,
    defaults: Option<&Defaults>,
    id: String,
) -> Result<Mapping, TransformError> {
    let default_headers = defaults.map(|d| &d.headers);

    let mut request = MappingRequest::new(mock.request.method, resolve_url_matcher(&mock.request)?);
    request.headers = merge_request_headers(default_headers, &mock.request.headers);
    request.query_parameters = mock.request.query_parameters.clone();
    request.cookies = mock.request.cookies.clone();
    request.body_patterns = mock
        .request
        .body_patterns
        .iter()
        .map(convert_body_pattern)
        .collect();

    let status = mock.response.status;
    let mut response =
        MappingResponse::new(u16::try_from(status).map_err(|_| TransformError::Status(status))?);
    response.headers = merge_response_headers(default_headers, &mock.response.headers);
    response.fixed_delay_milliseconds = mock.response.fixed_delay_milliseconds;
    response.proxy_base_url = mock.response.proxy_base_url.clone();

    let body = mock.response.body.as_ref();
    response.body = body.and_then(|spec| match spec.kind {
        BodyKind::Inline => spec.value.clone().map(ResponseBody::Inline),
        BodyKind::File => spec.file_name.clone().map(ResponseBody::File),
    });

    let templating = body
        .and_then(|spec| spec.templating)
        .or_else(|| defaults.and_then(|d| d.templating_enabled))
        .unwrap_or(false);
    if templating {
        response
            .transformers
            .push(RESPONSE_TEMPLATE_TRANSFORMER.to_string());
    }

    let scenario = mock.scenario.as_ref();
    Ok(Mapping {
        id,
        name: mock.name.clone(),
        priority: mock.priority.or_else(|| defaults.and_then(|d| d.priority)),
        request,
        response,
        scenario_name: scenario.map(|s| s.name.clone()),
        required_scenario_state: scenario.map(|s| s.required_state.clone()),
        new_scenario_state: scenario.map(|s| s.new_state.clone()),
        metadata: mock.metadata.clone(),
    })
}

/// Pick the URL strategy: `url`, `urlPattern`, `urlPath`, `urlPathPattern`,
/// then `pathTemplate` (as a path regex). First present wins.
pub fn resolve_url_matcher(request: &RequestSpec) -> Result<Option<UrlMatcher>, TransformError> {
    let matcher = if let Some(url) = &request.url {
        UrlMatcher::Url(url.clone())
    } else if let Some(pattern) = &request.url_pattern {
        UrlMatcher::UrlPattern(pattern.clone())
    } else if let Some(path) = &request.url_path {
        UrlMatcher::UrlPath(path.clone())
    } else if let Some(pattern) = &request.url_path_pattern {
        UrlMatcher::UrlPathPattern(pattern.clone())
    } else if let Some(template) = &request.path_template {
        UrlMatcher::UrlPathPattern(template_to_regex(template)?)
    } else {
        return Ok(None);
    };
    Ok(Some(matcher))
}

/// Default headers become exact matchers; mock headers replace them by name.
fn merge_request_headers(
    defaults: Option<&BTreeMap<String, String>>,
    overrides: &BTreeMap<String, Matcher>,
) -> BTreeMap<String, Matcher> {
    let mut merged: BTreeMap<String, Matcher> = defaults
        .into_iter()
        .flatten()
        .map(|(name, value)| (name.clone(), Matcher::EqualTo(value.clone())))
        .collect();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Shallow merge by key, mock values winning.
fn merge_response_headers(
    defaults: Option<&BTreeMap<String, String>>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.cloned().unwrap_or_default();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

fn convert_body_pattern(pattern: &BodyPatternSpec) -> BodyPattern {
    match pattern {
        BodyPatternSpec::EqualToJson(equality) => BodyPattern::EqualToJson {
            equal_to_json: equality.json.clone(),
            ignore_extra_elements: equality.ignore_extra_elements,
            ignore_array_order: equality.ignore_array_order,
        },
        BodyPatternSpec::MatchesJsonPath(path) => BodyPattern::MatchesJsonPath {
            matches_json_path: path.clone(),
        },
    }
}

fn normalize_legacy(
    document: &LegacyDocument,
    ids: &mut IdAllocator,
) -> Vec<Result<Mapping, TransformError>> {
    document
        .mappings
        .iter()
        .map(|mapping| normalize_legacy_mapping(mapping, ids))
        .collect()
}

fn normalize_legacy_mapping(
    mapping: &LegacyMapping,
    ids: &mut IdAllocator,
) -> Result<Mapping, TransformError> {
    let url = match (&mapping.request.url, &mapping.request.url_pattern) {
        (Some(url), _) => Some(UrlMatcher::Url(url.clone())),
        (None, Some(pattern)) => Some(UrlMatcher::UrlPattern(pattern.clone())),
        (None, None) => None,
    };

    let status = mapping.response.status;
    let mut response =
        MappingResponse::new(u16::try_from(status).map_err(|_| TransformError::Status(status))?);
    response.headers = mapping.response.headers.clone();
    response.body = mapping.response.body.clone().map(ResponseBody::Inline);

    Ok(Mapping {
        id: ids.claim(mapping.id.as_deref()),
        name: None,
        priority: mapping.priority,
        request: MappingRequest::new(mapping.request.method, url),
        response,
        scenario_name: None,
        required_scenario_state: None,
        new_scenario_state: None,
        metadata: None,
    })
}

/// Hands out ids that are unique within one batch.
#[derive(Debug, Default)]
struct IdAllocator {
    issued: HashSet<String>,
}

impl IdAllocator {
    fn fresh(&mut self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Keep an existing id unless it is empty or already issued.
    fn claim(&mut self, existing: Option<&str>) -> String {
        match existing {
            Some(id) if !id.is_empty() && self.issued.insert(id.to_string()) => id.to_string(),
            _ => self.fresh(),
        }
    }
}
