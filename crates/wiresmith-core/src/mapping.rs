//! Canonical stub-server mappings, the unit of storage and deployment.

use crate::document::{HttpMethod, Matcher};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Response transformer name enabling response templating on the stub server.
pub const RESPONSE_TEMPLATE_TRANSFORMER: &str = "response-template";

/// A target-system-ready mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Opaque identity, unique within a generation batch.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    pub request: MappingRequest,
    pub response: MappingResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scenario_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_scenario_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Mapping {
    /// A copy of this mapping with the id cleared, for id-insensitive comparison.
    pub fn without_id(&self) -> Self {
        Self {
            id: String::new(),
            ..self.clone()
        }
    }
}

/// The single resolved URL strategy of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UrlMatcher {
    /// Exact path and query.
    Url(String),
    /// Regex over path and query.
    UrlPattern(String),
    /// Exact path.
    UrlPath(String),
    /// Regex over the path.
    UrlPathPattern(String),
}

impl UrlMatcher {
    pub fn value(&self) -> &str {
        match self {
            UrlMatcher::Url(v)
            | UrlMatcher::UrlPattern(v)
            | UrlMatcher::UrlPath(v)
            | UrlMatcher::UrlPathPattern(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRequest {
    pub method: HttpMethod,
    /// Absent means any URL.
    #[serde(flatten)]
    pub url: Option<UrlMatcher>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query_parameters: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cookies: BTreeMap<String, Matcher>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_patterns: Vec<BodyPattern>,
}

impl MappingRequest {
    pub fn new(method: HttpMethod, url: Option<UrlMatcher>) -> Self {
        Self {
            method,
            url,
            query_parameters: BTreeMap::new(),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            body_patterns: Vec::new(),
        }
    }
}

/// Request body pattern in stub-server form. Optional flags are emitted only
/// when they were set on the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyPattern {
    #[serde(rename_all = "camelCase")]
    EqualToJson {
        equal_to_json: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ignore_extra_elements: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ignore_array_order: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    MatchesJsonPath { matches_json_path: String },
}

/// Response body: a literal string or a file reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseBody {
    #[serde(rename = "body")]
    Inline(String),
    #[serde(rename = "bodyFileName")]
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(flatten)]
    pub body: Option<ResponseBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_delay_milliseconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformers: Vec<String>,
}

impl MappingResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
            fixed_delay_milliseconds: None,
            proxy_base_url: None,
            transformers: Vec::new(),
        }
    }
}
