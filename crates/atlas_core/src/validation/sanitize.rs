//! Best-effort normalization of free-text input.

use serde_json::Value;

/// Default maximum length in characters.
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Strips null characters, trims surrounding whitespace and truncates to
/// `max_length` characters.
///
/// Whitespace exposed at the end by truncation is trimmed too, so applying
/// the function twice yields the same result as applying it once.
pub fn sanitize_string(input: &str, max_length: usize) -> String {
    let without_nulls: String = input.chars().filter(|c| *c != '\0').collect();
    let truncated: String = without_nulls.trim().chars().take(max_length).collect();
    truncated.trim_end().to_string()
}

/// Like [`sanitize_string`], but any non-string value yields an empty string.
pub fn sanitize_value(value: &Value, max_length: usize) -> String {
    value
        .as_str()
        .map(|text| sanitize_string(text, max_length))
        .unwrap_or_default()
}
