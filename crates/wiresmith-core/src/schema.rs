//! Structural validation against a constrained JSON-Schema dialect.
//!
//! Supported keywords: `type`, `required`, `enum`, `minimum`, `format: "uri"`,
//! `properties`, `items`, `additionalProperties` and `oneOf`. Anything else in a
//! schema document is ignored.

use crate::types::{child_path, index_path, ValidationError, ROOT_PATH};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Raw JSON text of the canonical document schema.
pub const DOCUMENT_SCHEMA_JSON: &str = include_str!("../schema/mock-document.schema.json");

static DOCUMENT_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    serde_json::from_str(DOCUMENT_SCHEMA_JSON).expect("embedded document schema is valid")
});

/// Schema for the canonical ("mocks") document dialect.
pub fn document_schema() -> &'static Schema {
    &DOCUMENT_SCHEMA
}

/// JSON value kinds a schema node can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Boolean,
}

impl SchemaType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            SchemaType::Object => value.is_object(),
            SchemaType::Array => value.is_array(),
            SchemaType::String => value.is_string(),
            SchemaType::Integer => value.is_i64() || value.is_u64(),
            SchemaType::Boolean => value.is_boolean(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
        }
    }
}

/// String formats understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Absolute URI (scheme required).
    Uri,
}

/// `additionalProperties` is either a sub-schema or a plain allow/deny flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// One node of a schema tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
}

impl Schema {
    /// A schema demanding the given kind and nothing else.
    pub fn of(kind: SchemaType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_required<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn with_items(mut self, schema: Schema) -> Self {
        self.items = Some(Box::new(schema));
        self
    }

    pub fn with_enum(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_additional(mut self, additional: AdditionalProperties) -> Self {
        self.additional_properties = Some(additional);
        self
    }

    pub fn with_one_of(mut self, branches: impl IntoIterator<Item = Schema>) -> Self {
        self.one_of.extend(branches);
        self
    }
}

/// Validate `value` against `schema`, reporting problems below `path`.
///
/// An empty `path` denotes the document root; child locations are built as
/// `parent.key` and `parent[index]`.
pub fn validate(value: &Value, schema: &Schema, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_node(value, schema, path, &mut errors);
    errors
}

fn validate_node(value: &Value, schema: &Schema, path: &str, errors: &mut Vec<ValidationError>) {
    if let Some(kind) = schema.kind {
        if !kind.matches(value) {
            errors.push(ValidationError::error(
                location(path),
                format!("Expected {}, found {}", kind.label(), kind_of(value)),
            ));
            return;
        }
    }

    if let Some(allowed) = &schema.enum_values {
        if !allowed.contains(value) {
            let choices: Vec<String> = allowed.iter().map(Value::to_string).collect();
            errors.push(ValidationError::error(
                location(path),
                format!("Value {value} is not one of: {}", choices.join(", ")),
            ));
        }
    }

    if let Some(minimum) = schema.minimum {
        if let Some(number) = value.as_f64() {
            if number < minimum {
                errors.push(ValidationError::error(
                    location(path),
                    format!("Value {value} is below the minimum of {minimum}"),
                ));
            }
        }
    }

    if let (Some(Format::Uri), Some(text)) = (schema.format, value.as_str()) {
        if let Err(e) = Url::parse(text) {
            errors.push(ValidationError::error(
                location(path),
                format!("'{text}' is not a valid absolute URI: {e}"),
            ));
        }
    }

    if let Some(object) = value.as_object() {
        if schema.kind == Some(SchemaType::Object) {
            for key in &schema.required {
                if !object.contains_key(key) {
                    errors.push(ValidationError::error(
                        child_path(path, key),
                        format!("Missing required field: {key}"),
                    ));
                }
            }
        }

        for (name, property) in &schema.properties {
            if let Some(child) = object.get(name) {
                validate_node(child, property, &child_path(path, name), errors);
            }
        }

        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(extra)) => {
                for (name, child) in object {
                    if !schema.properties.contains_key(name) {
                        validate_node(child, extra, &child_path(path, name), errors);
                    }
                }
            }
            Some(AdditionalProperties::Allowed(false)) => {
                for name in object.keys() {
                    if !schema.properties.contains_key(name) {
                        errors.push(ValidationError::error(
                            child_path(path, name),
                            format!("Unexpected property: {name}"),
                        ));
                    }
                }
            }
            Some(AdditionalProperties::Allowed(true)) | None => {}
        }
    }

    if let (Some(items), Some(array)) = (&schema.items, value.as_array()) {
        for (index, item) in array.iter().enumerate() {
            validate_node(item, items, &index_path(path, index), errors);
        }
    }

    if !schema.one_of.is_empty() {
        // Every branch is evaluated so that multiple matches can be reported.
        let outcomes: Vec<bool> = schema
            .one_of
            .iter()
            .map(|branch| validate(value, branch, path).is_empty())
            .collect();
        let matched = outcomes.iter().filter(|ok| **ok).count();
        match matched {
            1 => {}
            0 => errors.push(ValidationError::error(
                location(path),
                format!(
                    "Value does not match any of the {} allowed shapes",
                    outcomes.len()
                ),
            )),
            n => errors.push(ValidationError::error(
                location(path),
                format!("Value matches {n} of the allowed shapes; exactly one is required"),
            )),
        }
    }
}

fn location(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
