//! Input validation for uploaded files, parsed JSON and stored projects.
//!
//! # Responsibility
//! - Reject malformed external input before it reaches application state.
//! - Report a stable error code, a human-readable error and a detail string.
//!
//! # Invariants
//! - Validators never panic; every failure is a `ValidationError` value.
//! - Validation is whole-or-nothing: one bad element rejects the container.
//! - No coercion: a value of the wrong JSON kind is invalid.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod file;
pub mod json;
pub mod project;
pub mod sanitize;
pub mod schema;

pub use file::{validate_file, FileCandidate, MAX_FILE_SIZE_BYTES};
pub use json::validate_json;
pub use project::{parse_project, parse_projects, validate_project, validate_projects_array};
pub use sanitize::{sanitize_string, sanitize_value, DEFAULT_MAX_LENGTH};

/// Ceiling for one serialized storage value (5 MiB).
pub const MAX_STORAGE_BYTES: usize = 5 * 1024 * 1024;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Error code of a failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    NoFile,
    FileTooLarge,
    InvalidType,
    EmptyFile,
    InvalidJson,
    InvalidProjectData,
    InvalidProjectId,
    InvalidProjectName,
    InvalidTimestamp,
    InvalidNodes { index: usize },
    InvalidEdges { index: usize },
    InvalidPersonas { index: usize },
    NotAnArray,
    DataTooLarge,
    InvalidProjectAtIndex { index: usize },
}

impl ValidationErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::NoFile => "no_file",
            Self::FileTooLarge => "file_too_large",
            Self::InvalidType => "invalid_type",
            Self::EmptyFile => "empty_file",
            Self::InvalidJson => "invalid_json",
            Self::InvalidProjectData => "invalid_project_data",
            Self::InvalidProjectId => "invalid_project_id",
            Self::InvalidProjectName => "invalid_project_name",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidNodes { .. } => "invalid_nodes",
            Self::InvalidEdges { .. } => "invalid_edges",
            Self::InvalidPersonas { .. } => "invalid_personas",
            Self::NotAnArray => "not_an_array",
            Self::DataTooLarge => "data_too_large",
            Self::InvalidProjectAtIndex { .. } => "invalid_project_at_index",
        }
    }

    /// Short user-facing error text.
    pub fn message(self) -> String {
        match self {
            Self::NoFile => "No file provided".to_string(),
            Self::FileTooLarge => "File too large".to_string(),
            Self::InvalidType => "Invalid file type".to_string(),
            Self::EmptyFile => "Empty file".to_string(),
            Self::InvalidJson => "Invalid JSON".to_string(),
            Self::InvalidProjectData => "Invalid project data".to_string(),
            Self::InvalidProjectId => "Invalid project ID".to_string(),
            Self::InvalidProjectName => "Invalid project name".to_string(),
            Self::InvalidTimestamp => "Invalid timestamp".to_string(),
            Self::InvalidNodes { .. } => "Invalid nodes".to_string(),
            Self::InvalidEdges { .. } => "Invalid edges".to_string(),
            Self::InvalidPersonas { .. } => "Invalid personas".to_string(),
            Self::NotAnArray => "Invalid data format".to_string(),
            Self::DataTooLarge => "Data too large".to_string(),
            Self::InvalidProjectAtIndex { index } => format!("Invalid project at index {index}"),
        }
    }

    /// Offending element index for array-scoped failures.
    pub fn index(self) -> Option<usize> {
        match self {
            Self::InvalidNodes { index }
            | Self::InvalidEdges { index }
            | Self::InvalidPersonas { index }
            | Self::InvalidProjectAtIndex { index } => Some(index),
            _ => None,
        }
    }
}

/// Failed validation with its code and free-text detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub details: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
        }
    }

    /// Short user-facing error text (see [`ValidationErrorKind::message`]).
    pub fn error(&self) -> String {
        self.kind.message()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.details.is_empty() {
            write!(f, "{}", self.kind.message())
        } else {
            write!(f, "{}: {}", self.kind.message(), self.details)
        }
    }
}

impl Error for ValidationError {}

/// Serializable `{valid, error, details}` envelope for UI and CLI callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ValidationReport {
    pub fn from_result<T>(result: &ValidationResult<T>) -> Self {
        match result {
            Ok(_) => Self {
                valid: true,
                code: None,
                error: None,
                details: None,
            },
            Err(err) => Self {
                valid: false,
                code: Some(err.kind.code()),
                error: Some(err.error()),
                details: Some(err.details.clone()).filter(|details| !details.is_empty()),
            },
        }
    }
}

/// Formats a byte count as mebibytes with two decimals.
pub(crate) fn format_mib(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::{format_mib, ValidationError, ValidationErrorKind, ValidationReport};

    #[test]
    fn display_joins_message_and_details() {
        let err = ValidationError::new(
            ValidationErrorKind::InvalidNodes { index: 2 },
            "Node at index 2 is invalid",
        );
        assert_eq!(err.to_string(), "Invalid nodes: Node at index 2 is invalid");
        assert_eq!(err.kind.index(), Some(2));
    }

    #[test]
    fn report_mirrors_result() {
        let ok: Result<(), ValidationError> = Ok(());
        assert!(ValidationReport::from_result(&ok).valid);

        let failed: Result<(), ValidationError> =
            Err(ValidationError::new(ValidationErrorKind::EmptyFile, ""));
        let report = ValidationReport::from_result(&failed);
        assert!(!report.valid);
        assert_eq!(report.code, Some("empty_file"));
        assert_eq!(report.error.as_deref(), Some("Empty file"));
        assert_eq!(report.details, None);
    }

    #[test]
    fn formats_mebibytes_with_two_decimals() {
        assert_eq!(format_mib(12 * 1024 * 1024), "12.00MB");
        assert_eq!(format_mib(1536 * 1024), "1.50MB");
    }
}
