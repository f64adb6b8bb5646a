//! Whole-project and project-array validation.
//!
//! # Invariants
//! - A project with one malformed node, edge or persona is rejected whole.
//! - Array validation stops at the first invalid project and names its index.
//! - The serialized size ceiling is enforced before any element is inspected.

use super::schema::{
    check_field, check_record, FieldKind, FieldSpec, RecordSchema, EDGE_SCHEMA, NODE_SCHEMA,
    PERSONA_SCHEMA,
};
use super::{format_mib, ValidationError, ValidationErrorKind, ValidationResult, MAX_STORAGE_BYTES};
use crate::model::project::Project;
use serde_json::Value;
use std::io;

type IndexedKind = fn(usize) -> ValidationErrorKind;

const DATA_ARRAYS: &[(&str, RecordSchema, IndexedKind)] = &[
    ("nodes", NODE_SCHEMA, invalid_nodes),
    ("edges", EDGE_SCHEMA, invalid_edges),
    ("personas", PERSONA_SCHEMA, invalid_personas),
];

fn invalid_nodes(index: usize) -> ValidationErrorKind {
    ValidationErrorKind::InvalidNodes { index }
}

fn invalid_edges(index: usize) -> ValidationErrorKind {
    ValidationErrorKind::InvalidEdges { index }
}

fn invalid_personas(index: usize) -> ValidationErrorKind {
    ValidationErrorKind::InvalidPersonas { index }
}

const TOP_LEVEL_FIELDS: &[(FieldSpec, ValidationErrorKind)] = &[
    (
        FieldSpec {
            name: "id",
            kind: FieldKind::String,
        },
        ValidationErrorKind::InvalidProjectId,
    ),
    (
        FieldSpec {
            name: "name",
            kind: FieldKind::String,
        },
        ValidationErrorKind::InvalidProjectName,
    ),
    (
        FieldSpec {
            name: "lastModified",
            kind: FieldKind::Integer,
        },
        ValidationErrorKind::InvalidTimestamp,
    ),
];

/// Validates one project document.
///
/// # Errors
/// - `InvalidProjectData` when the value or its `data` is not an object, or
///   `data` lacks one of the `nodes`/`edges`/`personas` arrays.
/// - `InvalidProjectId` / `InvalidProjectName` / `InvalidTimestamp` for bad top-level fields.
/// - `InvalidNodes` / `InvalidEdges` / `InvalidPersonas` with the first bad index.
pub fn validate_project(value: &Value) -> ValidationResult<()> {
    let Some(project) = value.as_object() else {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidProjectData,
            "Project must be an object",
        ));
    };

    for (spec, kind) in TOP_LEVEL_FIELDS {
        check_field(project.get(spec.name), *spec)
            .map_err(|violation| ValidationError::new(*kind, violation.to_string()))?;
    }

    let Some(data) = project.get("data").and_then(Value::as_object) else {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidProjectData,
            "Project data must be an object",
        ));
    };

    for (name, _, _) in DATA_ARRAYS {
        if !data.get(*name).is_some_and(Value::is_array) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidProjectData,
                format!("Project data must contain a `{name}` array"),
            ));
        }
    }

    for (name, schema, kind) in DATA_ARRAYS {
        let items = data
            .get(*name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (index, item) in items.iter().enumerate() {
            check_record(item, schema).map_err(|violation| {
                ValidationError::new(
                    kind(index),
                    format!("{} at index {index} is invalid: {violation}", schema.name),
                )
            })?;
        }
    }

    Ok(())
}

/// Validates an array of project documents.
///
/// # Errors
/// - `NotAnArray` when `value` is not an array.
/// - `DataTooLarge` when the serialized JSON exceeds [`MAX_STORAGE_BYTES`].
/// - `InvalidProjectAtIndex` wrapping the first element failure.
pub fn validate_projects_array(value: &Value) -> ValidationResult<()> {
    let Some(projects) = value.as_array() else {
        return Err(ValidationError::new(
            ValidationErrorKind::NotAnArray,
            "Expected an array of projects",
        ));
    };

    let size = serialized_len(value);
    if size > MAX_STORAGE_BYTES {
        return Err(ValidationError::new(
            ValidationErrorKind::DataTooLarge,
            format!(
                "Data size is {}. Maximum allowed size is {}.",
                format_mib(size as u64),
                format_mib(MAX_STORAGE_BYTES as u64)
            ),
        ));
    }

    for (index, project) in projects.iter().enumerate() {
        validate_project(project).map_err(|err| {
            ValidationError::new(
                ValidationErrorKind::InvalidProjectAtIndex { index },
                format!("{}: {}", err.error(), err.details),
            )
        })?;
    }

    Ok(())
}

/// Validates and converts one project document.
pub fn parse_project(value: Value) -> ValidationResult<Project> {
    validate_project(&value)?;
    serde_json::from_value(value).map_err(|err| {
        ValidationError::new(ValidationErrorKind::InvalidProjectData, err.to_string())
    })
}

/// Validates and converts an array of project documents.
pub fn parse_projects(value: Value) -> ValidationResult<Vec<Project>> {
    validate_projects_array(&value)?;
    serde_json::from_value(value).map_err(|err| {
        ValidationError::new(ValidationErrorKind::InvalidProjectData, err.to_string())
    })
}

/// Serialized JSON length in bytes, computed without buffering the output.
pub(crate) fn serialized_len(value: &Value) -> usize {
    let mut counter = ByteCounter(0);
    // Serializing a `Value` into a counting sink cannot fail.
    let _ = serde_json::to_writer(&mut counter, value);
    counter.0
}

struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
