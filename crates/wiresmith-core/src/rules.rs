//! Business rules that go beyond document structure.
//!
//! Rules run on the typed document and derive their own `mocks[i].<field>`
//! locations. Every rule is evaluated for every mock; none short-circuits.

use crate::document::{
    AuthType, Document, LegacyDocument, Matcher, MockDocument, MockEntry, RequestSpec,
};
use crate::path_template::parse_path_template;
use crate::types::{child_path, index_path, ValidationError};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

/// Inclusive range of acceptable HTTP status codes.
pub const STATUS_RANGE: std::ops::RangeInclusive<i64> = 100..=599;

/// Run all business rules for a typed document.
pub fn validate_business_rules(document: &Document) -> Vec<ValidationError> {
    match document {
        Document::Canonical(doc) => validate_mock_document(doc),
        Document::Legacy(doc) => validate_legacy_document(doc),
    }
}

fn validate_mock_document(document: &MockDocument) -> Vec<ValidationError> {
    let mut issues = Vec::new();

    for (idx, mock) in document.mocks.iter().enumerate() {
        validate_mock(mock, &index_path("mocks", idx), &mut issues);
    }

    check_auth(document, &mut issues);
    issues
}

/// Validate a single mock located at `location`.
pub fn validate_mock(mock: &MockEntry, location: &str, issues: &mut Vec<ValidationError>) {
    let request_location = child_path(location, "request");
    let response_location = child_path(location, "response");

    check_url_matchers(&mock.request, &request_location, issues);
    check_patterns(&mock.request, &request_location, issues);
    check_status(mock.response.status, &response_location, issues);

    if let Some(body) = &mock.response.body {
        if let Some(field) = body.missing_field() {
            issues.push(ValidationError::error(
                child_path(&response_location, "body"),
                format!("Response body of this type requires a non-empty '{field}'"),
            ));
        }
    }
}

fn check_url_matchers(request: &RequestSpec, location: &str, issues: &mut Vec<ValidationError>) {
    if !request.has_url_matcher() {
        issues.push(ValidationError::warning(
            location,
            "No URL matcher (url, urlPattern, urlPath, urlPathPattern or pathTemplate); \
             the mock will match every path",
        ));
    }

    if request.has_url_conflict() {
        issues.push(ValidationError::warning(
            location,
            "'url' is combined with another URL matcher; 'url' takes precedence",
        ));
    }
}

fn check_patterns(request: &RequestSpec, location: &str, issues: &mut Vec<ValidationError>) {
    for (field, pattern) in [
        ("urlPattern", &request.url_pattern),
        ("urlPathPattern", &request.url_path_pattern),
    ] {
        if let Some(pattern) = pattern {
            check_regex(pattern, &child_path(location, field), issues);
        }
    }

    if let Some(template) = &request.path_template {
        if let Err(e) = parse_path_template(template) {
            issues.push(ValidationError::error(
                child_path(location, "pathTemplate"),
                e.to_string(),
            ));
        }
    }

    for (field, matchers) in [
        ("queryParameters", &request.query_parameters),
        ("headers", &request.headers),
        ("cookies", &request.cookies),
    ] {
        check_matcher_patterns(matchers, &child_path(location, field), issues);
    }
}

fn check_matcher_patterns(
    matchers: &BTreeMap<String, Matcher>,
    location: &str,
    issues: &mut Vec<ValidationError>,
) {
    for (name, matcher) in matchers {
        if let Matcher::Matches(pattern) = matcher {
            check_regex(
                pattern,
                &child_path(&child_path(location, name), "matches"),
                issues,
            );
        }
    }
}

fn check_regex(pattern: &str, location: &str, issues: &mut Vec<ValidationError>) {
    if let Err(e) = Regex::new(pattern) {
        issues.push(ValidationError::error(
            location,
            format!("Invalid regex pattern: {e}"),
        ));
    }
}

fn check_status(status: i64, location: &str, issues: &mut Vec<ValidationError>) {
    if !STATUS_RANGE.contains(&status) {
        issues.push(ValidationError::error(
            child_path(location, "status"),
            format!("Invalid HTTP status code: {status} (must be 100-599)"),
        ));
    }
}

/// Auth completeness is checked once per document.
fn check_auth(document: &MockDocument, issues: &mut Vec<ValidationError>) {
    let Some(auth) = document.target.as_ref().and_then(|t| t.auth.as_ref()) else {
        return;
    };

    let missing = auth.missing_fields();
    if !missing.is_empty() {
        issues.push(ValidationError::error(
            "target.auth",
            format!(
                "{} authentication requires: {}",
                match auth.kind {
                    AuthType::Basic => "Basic",
                    AuthType::Bearer => "Bearer",
                    AuthType::None => "None",
                },
                missing.join(", ")
            ),
        ));
    }
}

fn validate_legacy_document(document: &LegacyDocument) -> Vec<ValidationError> {
    let mut issues = Vec::new();
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();

    for (idx, mapping) in document.mappings.iter().enumerate() {
        let location = index_path("mappings", idx);
        let request_location = child_path(&location, "request");

        if let Some(id) = mapping.id.as_deref() {
            if let Some(first) = seen_ids.get(id) {
                issues.push(ValidationError::warning(
                    child_path(&location, "id"),
                    format!("Duplicate id '{id}' (same as mappings[{first}]); a new id will be assigned"),
                ));
            } else {
                seen_ids.insert(id, idx);
            }
        }

        match (&mapping.request.url, &mapping.request.url_pattern) {
            (None, None) => issues.push(ValidationError::warning(
                &request_location,
                "No URL matcher (url or urlPattern); the mapping will match every path",
            )),
            (Some(_), Some(_)) => issues.push(ValidationError::warning(
                &request_location,
                "'url' is combined with 'urlPattern'; 'url' takes precedence",
            )),
            _ => {}
        }

        if let Some(pattern) = &mapping.request.url_pattern {
            check_regex(pattern, &child_path(&request_location, "urlPattern"), &mut issues);
        }

        check_status(
            mapping.response.status,
            &child_path(&location, "response"),
            &mut issues,
        );
    }

    issues
}
