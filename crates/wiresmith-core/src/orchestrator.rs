//! Validation Orchestrator.
//!
//! Entry point for raw documents: detects the dialect, maps the document onto
//! its typed shape, runs the schema (canonical documents only) and the business
//! rules, and folds everything into a [`ValidationResult`]. Nothing escapes as
//! an error; every failure becomes a diagnostic.

use crate::document::{value_kind, Dialect, Document, DocumentError, SourceFormat, Target};
use crate::mapping::Mapping;
use crate::rules::validate_business_rules;
use crate::schema::{document_schema, validate};
use crate::transform::{transform_with_report, TransformFailure};
use crate::types::{ValidationError, ValidationResult};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Outcome of a successful generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub dialect: Dialect,
    pub mappings: Vec<Mapping>,
    /// Warnings from validation; they never block generation.
    pub warnings: Vec<ValidationError>,
    /// Items the transformer had to exclude.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TransformFailure>,
    /// Deployment target declared by the document.
    #[serde(skip)]
    pub target: Option<Target>,
}

struct Inspection {
    result: ValidationResult,
    document: Option<Document>,
}

/// Validate a raw document.
pub fn validate_document(raw: &Value) -> ValidationResult {
    inspect(raw).result
}

/// Parse `text` in the given format and validate it. Parse failures become a
/// single root-level error.
pub fn validate_str(text: &str, format: SourceFormat) -> ValidationResult {
    match format.parse(text) {
        Ok(raw) => validate_document(&raw),
        Err(e) => ValidationResult::root_error(e.to_string()),
    }
}

/// Validate and, when the document has no errors, transform it.
///
/// Fails closed: any validation error returns the full result instead of
/// mappings.
pub fn generate(raw: &Value) -> Result<Generation, ValidationResult> {
    let Inspection { result, document } = inspect(raw);
    let document = match document {
        Some(document) if result.is_valid => document,
        _ => return Err(result),
    };

    let report = transform_with_report(&document);
    info!(
        dialect = %document.dialect(),
        mappings = report.mappings.len(),
        warnings = result.warnings.len(),
        excluded = report.failures.len(),
        "Generated mappings"
    );

    Ok(Generation {
        dialect: document.dialect(),
        mappings: report.mappings,
        warnings: result.warnings,
        failures: report.failures,
        target: document.target().cloned(),
    })
}

fn inspect(raw: &Value) -> Inspection {
    if !raw.is_object() {
        let error = DocumentError::NotAnObject(value_kind(raw));
        return Inspection {
            result: ValidationResult::root_error(error.to_string()),
            document: None,
        };
    }

    let dialect = Dialect::detect(raw);
    let mut issues = match dialect {
        Dialect::Canonical => validate(raw, document_schema(), ""),
        Dialect::Legacy => Vec::new(),
    };

    // A shape failure on a schema-invalid document restates what the schema
    // already reported, so it only surfaces on its own.
    let document = match Document::from_value_as(raw, dialect) {
        Ok(document) => {
            issues.extend(validate_business_rules(&document));
            Some(document)
        }
        Err(e) => {
            if issues.is_empty() {
                issues.push(ValidationError::root(e.to_string()));
            }
            None
        }
    };

    let result = ValidationResult::from_issues(issues);
    debug!(
        %dialect,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validated document"
    );
    Inspection { result, document }
}
