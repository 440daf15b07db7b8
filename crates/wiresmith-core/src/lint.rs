//! File and directory front end over the orchestrator.

use crate::document::SourceFormat;
use crate::orchestrator::validate_str;
use crate::types::ValidationResult;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File extensions picked up by [`lint_directory`].
pub const DOCUMENT_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Validation outcome of one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    #[serde(serialize_with = "serialize_path")]
    pub file: PathBuf,
    pub result: ValidationResult,
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

/// Result of linting one or more files.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub files: Vec<FileReport>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Number of errors found.
    pub errors: usize,
    /// Number of warnings found.
    pub warnings: usize,
}

impl LintReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result for one file.
    pub fn add(&mut self, file: impl Into<PathBuf>, result: ValidationResult) {
        self.files_checked += 1;
        self.errors += result.errors.len();
        self.warnings += result.warnings.len();
        self.files.push(FileReport {
            file: file.into(),
            result,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    /// Check if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }

    /// Passed under the given strictness; strict mode also fails on warnings.
    pub fn passed(&self, strict: bool) -> bool {
        self.is_valid() && !(strict && self.has_warnings())
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: LintReport) {
        self.files.extend(other.files);
        self.files_checked += other.files_checked;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// Lint a single document file. The format follows the file extension.
pub fn lint_file(path: &Path) -> LintReport {
    let mut report = LintReport::new();
    let result = match std::fs::read_to_string(path) {
        Ok(text) => validate_str(&text, SourceFormat::from_path(path)),
        Err(e) => ValidationResult::root_error(format!("Failed to read file: {e}")),
    };
    report.add(path, result);
    report
}

/// Lint every document file in a directory (non-recursive), in name order.
pub fn lint_directory(path: &Path) -> LintReport {
    let mut report = LintReport::new();

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            report.add(
                path,
                ValidationResult::root_error(format!("Failed to read directory: {e}")),
            );
            return report;
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_document_file(p))
        .collect();
    files.sort();

    for file in files {
        report.merge(lint_file(&file));
    }
    report
}

/// Lint in-memory text (useful for request bodies and editors).
pub fn lint_str(text: &str, source_name: &str, format: SourceFormat) -> LintReport {
    let mut report = LintReport::new();
    report.add(source_name, validate_str(text, format));
    report
}

pub fn is_document_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
}
