//! Validation and transformation engine for declarative mock definitions.
//!
//! A mock definition document lists request/response pairs, document-wide
//! defaults and a deployment target. This crate checks such documents against
//! a schema plus business rules and turns valid ones into stub-server
//! mappings. It can be used as a library or through the `wiresmith-lint` CLI
//! binary.
//!
//! # Example
//!
//! ```no_run
//! use wiresmith_core::{generate, lint_directory, validate_document};
//! use std::path::Path;
//!
//! let raw = serde_json::json!({
//!     "version": "1.0",
//!     "mocks": [{"request": {"method": "GET", "url": "/health"}, "response": {"status": 200}}]
//! });
//!
//! let result = validate_document(&raw);
//! assert!(result.is_valid);
//!
//! let generation = generate(&raw).expect("document is valid");
//! println!("{}", serde_json::to_string_pretty(&generation.mappings).unwrap());
//!
//! // Lint a directory of JSON/YAML documents
//! let report = lint_directory(Path::new("./mocks"));
//! if report.has_errors() {
//!     eprintln!("Found {} errors", report.errors);
//! }
//! ```

pub mod document;
pub mod lint;
pub mod mapping;
pub mod orchestrator;
pub mod path_template;
pub mod rules;
pub mod sample;
pub mod schema;
pub mod store;
pub mod transform;
mod types;

pub use document::{
    AuthSpec, AuthType, Dialect, Document, DocumentError, HttpMethod, Matcher, MockDocument,
    SourceFormat, Target,
};
pub use lint::{lint_directory, lint_file, lint_str, FileReport, LintReport};
pub use mapping::{BodyPattern, Mapping, MappingRequest, MappingResponse, ResponseBody, UrlMatcher};
pub use orchestrator::{generate, validate_document, validate_str, Generation};
pub use rules::validate_business_rules;
pub use sample::sample_document;
pub use schema::{document_schema, Schema};
pub use store::{MappingStore, StoreError};
pub use transform::{transform, transform_with_report, TransformError, TransformReport};
pub use types::{Severity, ValidationError, ValidationResult, ROOT_PATH};
