//! Upload file checks.
//!
//! Order of checks: presence, size ceiling, type, emptiness. The size ceiling
//! is checked before anything reads the content.

use super::{format_mib, ValidationError, ValidationErrorKind, ValidationResult};
use std::fs;
use std::path::Path;

/// Ceiling for uploaded project files (10 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

const JSON_MIME_TYPE: &str = "application/json";
const JSON_EXTENSION: &str = ".json";

/// Metadata of a candidate upload; content is not needed for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: Option<String>,
    pub size: u64,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.map(str::to_string),
            size,
        }
    }

    /// Builds a candidate from file-system metadata.
    ///
    /// The MIME type is inferred from the extension only.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size = fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = has_json_extension(&name).then(|| JSON_MIME_TYPE.to_string());
        Ok(Self {
            name,
            mime_type,
            size,
        })
    }

    fn is_json(&self) -> bool {
        has_json_extension(&self.name)
            || self
                .mime_type
                .as_deref()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JSON_MIME_TYPE))
    }
}

fn has_json_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(JSON_EXTENSION)
}

/// Validates an upload candidate.
///
/// # Errors
/// - `NoFile` when `file` is `None`.
/// - `FileTooLarge` when size exceeds [`MAX_FILE_SIZE_BYTES`]; details carry the size in MiB.
/// - `InvalidType` when neither the name nor the MIME type is JSON.
/// - `EmptyFile` when size is zero.
pub fn validate_file(file: Option<&FileCandidate>) -> ValidationResult<()> {
    let Some(file) = file else {
        return Err(ValidationError::new(
            ValidationErrorKind::NoFile,
            "Please select a file to import.",
        ));
    };

    if file.size > MAX_FILE_SIZE_BYTES {
        return Err(ValidationError::new(
            ValidationErrorKind::FileTooLarge,
            format!(
                "File size is {}. Maximum allowed size is {}.",
                format_mib(file.size),
                format_mib(MAX_FILE_SIZE_BYTES)
            ),
        ));
    }

    if !file.is_json() {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidType,
            format!("Only JSON files are allowed, got `{}`.", file.name),
        ));
    }

    if file.size == 0 {
        return Err(ValidationError::new(
            ValidationErrorKind::EmptyFile,
            "The selected file contains no data.",
        ));
    }

    Ok(())
}
