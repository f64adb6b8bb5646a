//! Declarative record schemas for builder nodes, edges and personas.
//!
//! A schema is a list of `field name -> expected kind` pairs checked
//! generically against a JSON object. Extra fields are ignored; missing
//! fields, wrong kinds and out-of-set enumeration values are violations.

use crate::model::project::{NodeType, PersonaCategory};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Expected JSON kind of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// Any JSON number.
    Number,
    /// Number with an integral value, in integer or float notation.
    Integer,
    Array,
    Object,
    /// String restricted to the listed values.
    OneOf(&'static [&'static str]),
}

impl FieldKind {
    fn describe(self) -> String {
        match self {
            Self::String => "a string".to_string(),
            Self::Number => "a number".to_string(),
            Self::Integer => "an integer".to_string(),
            Self::Array => "an array".to_string(),
            Self::Object => "an object".to_string(),
            Self::OneOf(allowed) => format!("one of {}", allowed.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Named set of required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

pub const NODE_SCHEMA: RecordSchema = RecordSchema {
    name: "Node",
    fields: &[
        field("id", FieldKind::String),
        field("type", FieldKind::OneOf(NodeType::WIRE_VALUES)),
        field("refId", FieldKind::String),
        field("x", FieldKind::Number),
        field("y", FieldKind::Number),
    ],
};

pub const EDGE_SCHEMA: RecordSchema = RecordSchema {
    name: "Edge",
    fields: &[
        field("id", FieldKind::String),
        field("source", FieldKind::String),
        field("target", FieldKind::String),
    ],
};

pub const PERSONA_SCHEMA: RecordSchema = RecordSchema {
    name: "Persona",
    fields: &[
        field("id", FieldKind::String),
        field("name", FieldKind::String),
        field("color", FieldKind::String),
        field("initials", FieldKind::String),
        field("category", FieldKind::OneOf(PersonaCategory::WIRE_VALUES)),
    ],
};

/// Why a value failed its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    NotAnObject,
    MissingField(&'static str),
    WrongKind {
        field: &'static str,
        expected: FieldKind,
    },
    NotAllowed {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

impl Display for SchemaViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "expected an object"),
            Self::MissingField(name) => write!(f, "missing field `{name}`"),
            Self::WrongKind { field, expected } => {
                write!(f, "field `{field}` must be {}", expected.describe())
            }
            Self::NotAllowed {
                field,
                value,
                allowed,
            } => write!(
                f,
                "field `{field}` must be one of {}, got `{value}`",
                allowed.join(", ")
            ),
        }
    }
}

/// Checks one field value against its expected kind.
pub fn check_field(value: Option<&Value>, spec: FieldSpec) -> Result<(), SchemaViolation> {
    let Some(value) = value else {
        return Err(SchemaViolation::MissingField(spec.name));
    };

    let matches = match spec.kind {
        FieldKind::String => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Integer => value
            .as_f64()
            .is_some_and(|number| number.is_finite() && number.fract() == 0.0),
        FieldKind::Array => value.is_array(),
        FieldKind::Object => value.is_object(),
        FieldKind::OneOf(allowed) => {
            let Some(text) = value.as_str() else {
                return Err(SchemaViolation::WrongKind {
                    field: spec.name,
                    expected: spec.kind,
                });
            };
            if !allowed.contains(&text) {
                return Err(SchemaViolation::NotAllowed {
                    field: spec.name,
                    value: text.to_string(),
                    allowed,
                });
            }
            true
        }
    };

    if matches {
        Ok(())
    } else {
        Err(SchemaViolation::WrongKind {
            field: spec.name,
            expected: spec.kind,
        })
    }
}

/// Checks every field of `schema` in declaration order, stopping at the first violation.
pub fn check_record(value: &Value, schema: &RecordSchema) -> Result<(), SchemaViolation> {
    let Some(object) = value.as_object() else {
        return Err(SchemaViolation::NotAnObject);
    };
    for spec in schema.fields {
        check_field(object.get(spec.name), *spec)?;
    }
    Ok(())
}

pub fn is_valid_node(value: &Value) -> bool {
    check_record(value, &NODE_SCHEMA).is_ok()
}

pub fn is_valid_edge(value: &Value) -> bool {
    check_record(value, &EDGE_SCHEMA).is_ok()
}

pub fn is_valid_persona(value: &Value) -> bool {
    check_record(value, &PERSONA_SCHEMA).is_ok()
}
