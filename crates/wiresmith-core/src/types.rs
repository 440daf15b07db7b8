//! Validation result types shared by every validator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location used for problems that concern the document as a whole.
pub const ROOT_PATH: &str = "$";

/// Severity level of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks generation and deployment.
    Error,
    /// Reported to the author, never affects validity.
    Warning,
}

impl Severity {
    /// Get the label for this severity level.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A single problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dot/bracket location inside the document (e.g. `mocks[0].response.status`).
    pub path: String,
    /// Human-readable description of the problem.
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    /// Create a new error.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Create a new warning.
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// Create an error located at the document root.
    pub fn root(message: impl Into<String>) -> Self {
        Self::error(ROOT_PATH, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity.label(), self.path, self.message)
    }
}

/// Outcome of validating one document.
///
/// `is_valid` is always `errors.is_empty()`; warnings never affect it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Partition a combined problem list by severity.
    pub fn from_issues(issues: impl IntoIterator<Item = ValidationError>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(ValidationError::is_error);
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A result holding a single root-level error.
    pub fn root_error(message: impl Into<String>) -> Self {
        Self::from_issues([ValidationError::root(message)])
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// All problems, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Get a summary string, e.g. for CLI output.
    pub fn summary(&self) -> String {
        let errors = self.errors.len();
        let warnings = self.warnings.len();
        match (errors, warnings) {
            (0, 0) => "Valid".to_string(),
            (0, w) => format!("{w} warning{}", plural(w)),
            (e, 0) => format!("{e} error{}", plural(e)),
            (e, w) => format!("{e} error{}, {w} warning{}", plural(e), plural(w)),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Append a property name to a diagnostic path.
pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Append an array index to a diagnostic path.
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_issues_partitions_by_severity() {
        let result = ValidationResult::from_issues([
            ValidationError::warning("mocks[0].request", "no matcher"),
            ValidationError::error("mocks[0].response.status", "bad status"),
        ]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.errors[0].path, "mocks[0].response.status");
    }

    #[test]
    fn test_warnings_only_is_valid() {
        let result =
            ValidationResult::from_issues([ValidationError::warning("mocks[1].request", "x")]);
        assert!(result.is_valid);
        assert_eq!(result.summary(), "1 warning");
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(ValidationResult::root_error("boom")).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"][0]["path"], "$");
        assert_eq!(json["errors"][0]["severity"], "error");
    }

    #[test]
    fn test_paths() {
        assert_eq!(child_path("", "version"), "version");
        assert_eq!(child_path("mocks[0]", "request"), "mocks[0].request");
        assert_eq!(index_path("mocks", 3), "mocks[3]");
    }
}
