//! Typed shapes of the two supported document dialects.
//!
//! A document is canonical when it carries an array-typed `mocks` field and
//! legacy otherwise. The classification is made once by [`Dialect::detect`] and
//! every later stage works on the matching [`Document`] variant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while turning raw input into a typed [`Document`].
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document must be an object, found {0}")]
    NotAnObject(&'static str),
    #[error("Invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Document does not match the {dialect} shape: {source}")]
    Shape {
        dialect: Dialect,
        #[source]
        source: serde_json::Error,
    },
}

/// Which of the two document shapes a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `mocks`-based documents with defaults and a deployment target.
    Canonical,
    /// Older `mappings`-based documents whose entries are already resolved.
    Legacy,
}

impl Dialect {
    /// Classify a raw document by the presence of an array-typed `mocks` field.
    pub fn detect(raw: &Value) -> Self {
        match raw.get("mocks") {
            Some(Value::Array(_)) => Dialect::Canonical,
            _ => Dialect::Legacy,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Canonical => f.write_str("canonical"),
            Dialect::Legacy => f.write_str("legacy"),
        }
    }
}

/// Text encodings accepted for documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// Pick a format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            _ => SourceFormat::Json,
        }
    }

    /// Parse text into a generic document value.
    pub fn parse(&self, text: &str) -> Result<Value, DocumentError> {
        match self {
            SourceFormat::Json => serde_json::from_str(text).map_err(DocumentError::Json),
            SourceFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        }
    }
}

/// A document in either dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Canonical(MockDocument),
    Legacy(LegacyDocument),
}

impl Document {
    /// Classify and deserialize a raw document.
    pub fn from_value(raw: &Value) -> Result<Self, DocumentError> {
        if !raw.is_object() {
            return Err(DocumentError::NotAnObject(value_kind(raw)));
        }
        let dialect = Dialect::detect(raw);
        Self::from_value_as(raw, dialect)
    }

    /// Deserialize a raw object into the shape of an already-detected dialect.
    pub(crate) fn from_value_as(raw: &Value, dialect: Dialect) -> Result<Self, DocumentError> {
        let shape_error = |source| DocumentError::Shape { dialect, source };
        match dialect {
            Dialect::Canonical => MockDocument::deserialize(raw)
                .map(Document::Canonical)
                .map_err(shape_error),
            Dialect::Legacy => LegacyDocument::deserialize(raw)
                .map(Document::Legacy)
                .map_err(shape_error),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Document::Canonical(_) => Dialect::Canonical,
            Document::Legacy(_) => Dialect::Legacy,
        }
    }

    /// Deployment target declared by the document, if any.
    pub fn target(&self) -> Option<&Target> {
        match self {
            Document::Canonical(doc) => doc.target.as_ref(),
            Document::Legacy(_) => None,
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Canonical dialect
// =============================================================================

/// Canonical mock definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDocument {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,
    /// Order is significant: mappings are produced in this order.
    pub mocks: Vec<MockEntry>,
}

/// Stub server the document deploys to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    None,
    Basic,
    Bearer,
}

/// Authentication settings as written in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSpec {
    #[serde(rename = "type")]
    pub kind: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthSpec {
    /// Names of the fields this auth type needs but does not have.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());
        let mut missing = Vec::new();
        match self.kind {
            AuthType::None => {}
            AuthType::Basic => {
                if !present(&self.username) {
                    missing.push("username");
                }
                if !present(&self.password) {
                    missing.push("password");
                }
            }
            AuthType::Bearer => {
                if !present(&self.token) {
                    missing.push("token");
                }
            }
        }
        missing
    }
}

/// Document-wide values merged into every mock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templating_enabled: Option<bool>,
}

/// One request/response rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    pub request: RequestSpec,
    pub response: ResponseSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Any,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request side of a mock. Any number of URL strategies may be written; the
/// transformer picks one in a fixed precedence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_template: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query_parameters: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cookies: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_patterns: Vec<BodyPatternSpec>,
}

impl RequestSpec {
    /// A request matching `method` on any URL.
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            url: None,
            url_pattern: None,
            url_path: None,
            url_path_pattern: None,
            path_template: None,
            query_parameters: BTreeMap::new(),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            body_patterns: Vec::new(),
        }
    }

    /// True when at least one URL strategy is set.
    pub fn has_url_matcher(&self) -> bool {
        [
            &self.url,
            &self.url_pattern,
            &self.url_path,
            &self.url_path_pattern,
            &self.path_template,
        ]
        .iter()
        .any(|field| field.is_some())
    }

    /// True when the exact `url` is combined with a pattern or path strategy.
    pub fn has_url_conflict(&self) -> bool {
        self.url.is_some()
            && (self.url_pattern.is_some()
                || self.url_path.is_some()
                || self.url_path_pattern.is_some())
    }
}

/// A string matcher; exactly one kind per matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Matcher {
    EqualTo(String),
    Contains(String),
    Matches(String),
}

/// Request body pattern as written in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyPatternSpec {
    EqualToJson(JsonEquality),
    MatchesJsonPath(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonEquality {
    pub json: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_extra_elements: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_array_order: Option<bool>,
}

/// Response side of a mock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    /// Kept wide so out-of-range codes reach the status rule instead of
    /// failing deserialization.
    pub status: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_delay_milliseconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodySpec>,
}

impl ResponseSpec {
    pub fn new(status: i64) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            fixed_delay_milliseconds: None,
            proxy_base_url: None,
            body: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Inline,
    File,
}

/// Response body as written in a document: `value` for inline bodies,
/// `fileName` for file bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySpec {
    #[serde(rename = "type")]
    pub kind: BodyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templating: Option<bool>,
}

impl BodySpec {
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            kind: BodyKind::Inline,
            value: Some(value.into()),
            file_name: None,
            templating: None,
        }
    }

    pub fn file(file_name: impl Into<String>) -> Self {
        Self {
            kind: BodyKind::File,
            value: None,
            file_name: Some(file_name.into()),
            templating: None,
        }
    }

    /// The field this body kind requires, if it is missing or empty.
    pub fn missing_field(&self) -> Option<&'static str> {
        let (field, value) = match self.kind {
            BodyKind::Inline => ("value", &self.value),
            BodyKind::File => ("fileName", &self.file_name),
        };
        match value.as_deref() {
            Some(v) if !v.is_empty() => None,
            _ => Some(field),
        }
    }
}

/// Stateful-behavior hint, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    pub required_state: String,
    pub new_state: String,
}

// =============================================================================
// Legacy dialect
// =============================================================================

/// Older document shape whose mappings are already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDocument {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub mappings: Vec<LegacyMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    pub request: LegacyRequest,
    pub response: LegacyResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRequest {
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyResponse {
    pub status: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
