//! JSON text parsing with structured failure.

use super::{ValidationError, ValidationErrorKind, ValidationResult};
use serde_json::Value;

/// Parses `text` as JSON.
///
/// Returns `InvalidJson` with the parser message on failure. No repair is attempted.
pub fn validate_json(text: &str) -> ValidationResult<Value> {
    serde_json::from_str(text)
        .map_err(|err| ValidationError::new(ValidationErrorKind::InvalidJson, err.to_string()))
}
