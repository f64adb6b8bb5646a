//! Builder project model.
//!
//! # Responsibility
//! - Define the user-authored workflow document saved by the builder.
//! - Provide small lifecycle helpers (creation, touch on save).
//!
//! # Invariants
//! - `id` is stable for the project lifetime; re-saving overwrites by `id`.
//! - `last_modified` is Unix epoch milliseconds.
//! - Node `type` and persona `category` only take the declared values.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Kind of a diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Task,
    Data,
    Constraint,
    Annotation,
    Touchpoint,
    Actor,
}

impl NodeType {
    /// Every accepted wire value, in declaration order.
    pub const WIRE_VALUES: &'static [&'static str] = &[
        "task",
        "data",
        "constraint",
        "annotation",
        "touchpoint",
        "actor",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Data => "data",
            Self::Constraint => "constraint",
            Self::Annotation => "annotation",
            Self::Touchpoint => "touchpoint",
            Self::Actor => "actor",
        }
    }
}

/// Actor category for personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaCategory {
    Human,
    Ai,
    System,
    Other,
}

impl PersonaCategory {
    pub const WIRE_VALUES: &'static [&'static str] = &["human", "ai", "system", "other"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::System => "system",
            Self::Other => "other",
        }
    }
}

/// Diagram vertex referencing a taxonomy entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Taxonomy id this node stands for (task, data artifact, ...).
    pub ref_id: String,
    pub x: f64,
    pub y: f64,
}

/// Directed link between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Actor/role annotation used inside a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub color: String,
    pub initials: String,
    pub category: PersonaCategory,
}

/// Diagram payload of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub nodes: Vec<BuilderNode>,
    pub edges: Vec<BuilderEdge>,
    pub personas: Vec<Persona>,
}

/// User-saved workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Unix epoch milliseconds of the last save.
    #[serde(deserialize_with = "epoch_ms")]
    pub last_modified: i64,
    pub data: ProjectData,
}

impl Project {
    /// Creates an empty project with a generated id, stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            last_modified: now_epoch_ms(),
            data: ProjectData::default(),
        }
    }

    /// Refreshes `last_modified` to the current time.
    pub fn touch(&mut self) {
        self.last_modified = now_epoch_ms();
    }

    /// Returns edges whose `source` or `target` does not name a node in this project.
    pub fn dangling_edges(&self) -> Vec<&BuilderEdge> {
        self.data
            .edges
            .iter()
            .filter(|edge| {
                !self.has_node(edge.source.as_str()) || !self.has_node(edge.target.as_str())
            })
            .collect()
    }

    fn has_node(&self, node_id: &str) -> bool {
        self.data.nodes.iter().any(|node| node.id == node_id)
    }
}

/// Reads any integral JSON number; values past the `i64` range saturate.
fn epoch_ms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(ms) = number.as_i64() {
        return Ok(ms);
    }
    if number.is_u64() {
        return Ok(i64::MAX);
    }
    match number.as_f64() {
        Some(ms) if ms.is_finite() && ms.fract() == 0.0 => Ok(ms as i64),
        _ => Err(D::Error::custom(format!(
            "lastModified must be an integral number, got {number}"
        ))),
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the clock reads before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{BuilderEdge, BuilderNode, NodeType, PersonaCategory, Project};

    fn node(id: &str) -> BuilderNode {
        BuilderNode {
            id: id.to_string(),
            node_type: NodeType::Task,
            ref_id: "summarize-content".to_string(),
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn wire_values_match_as_str() {
        for kind in [
            NodeType::Task,
            NodeType::Data,
            NodeType::Constraint,
            NodeType::Annotation,
            NodeType::Touchpoint,
            NodeType::Actor,
        ] {
            assert!(NodeType::WIRE_VALUES.contains(&kind.as_str()));
        }
        for category in [
            PersonaCategory::Human,
            PersonaCategory::Ai,
            PersonaCategory::System,
            PersonaCategory::Other,
        ] {
            assert!(PersonaCategory::WIRE_VALUES.contains(&category.as_str()));
        }
    }

    #[test]
    fn new_project_is_empty_with_generated_id() {
        let project = Project::new("Onboarding flow");
        assert!(!project.id.is_empty());
        assert!(project.last_modified > 0);
        assert!(project.data.nodes.is_empty());
        assert_ne!(project.id, Project::new("Onboarding flow").id);
    }

    #[test]
    fn serializes_with_camel_case_wire_fields() {
        let mut project = Project::new("p");
        project.data.nodes.push(node("n1"));
        let json = serde_json::to_value(&project).expect("serialize project");
        assert!(json.get("lastModified").is_some());
        assert_eq!(json["data"]["nodes"][0]["type"], "task");
        assert_eq!(json["data"]["nodes"][0]["refId"], "summarize-content");
    }

    #[test]
    fn reports_dangling_edges() {
        let mut project = Project::new("p");
        project.data.nodes.push(node("n1"));
        project.data.nodes.push(node("n2"));
        project.data.edges.push(BuilderEdge {
            id: "e1".to_string(),
            source: "n1".to_string(),
            target: "n2".to_string(),
        });
        project.data.edges.push(BuilderEdge {
            id: "e2".to_string(),
            source: "n2".to_string(),
            target: "gone".to_string(),
        });

        let dangling = project.dangling_edges();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].id, "e2");
    }
}
