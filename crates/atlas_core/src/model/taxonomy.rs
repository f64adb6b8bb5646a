//! Static taxonomy records.
//!
//! These describe the design vocabulary the builder references: layers,
//! AI/human/system tasks, touchpoints, data artifacts, constraints and
//! worked examples. They are authored content and never mutated at runtime.

use serde::{Deserialize, Serialize};

/// Who performs a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Ai,
    Human,
    System,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Human => "human",
            Self::System => "system",
        }
    }
}

/// Semantic kind of a directed relation between taxonomy entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Enables,
    Requires,
    Complements,
    AlternativeTo,
    FeedsInto,
}

/// Typed, weighted, directed edge to another taxonomy entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub target_id: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    /// Weight in `[0, 1]`.
    pub strength: f64,
    pub reason: String,
}

/// Reference to a data artifact consumed or produced by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoRef {
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoInputs {
    #[serde(default)]
    pub required: Vec<IoRef>,
    #[serde(default)]
    pub optional: Vec<IoRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoOutputs {
    #[serde(default)]
    pub primary: Vec<IoRef>,
    #[serde(default)]
    pub metadata: Vec<IoRef>,
}

/// Declared inputs and outputs of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoSpec {
    #[serde(default)]
    pub inputs: IoInputs,
    #[serde(default)]
    pub outputs: IoOutputs,
}

impl IoSpec {
    /// Iterates every artifact reference, inputs first.
    pub fn all_refs(&self) -> impl Iterator<Item = &IoRef> {
        self.inputs
            .required
            .iter()
            .chain(self.inputs.optional.iter())
            .chain(self.outputs.primary.iter())
            .chain(self.outputs.metadata.iter())
    }
}

/// Fields shared by AI, human and system tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCore {
    pub id: String,
    pub layer_id: String,
    pub name: String,
    pub slug: String,
    pub task_type: TaskType,
    pub elevator_pitch: String,
    #[serde(default)]
    pub io_spec: IoSpec,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTask {
    #[serde(flatten)]
    pub core: TaskCore,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanTask {
    #[serde(flatten)]
    pub core: TaskCore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemTask {
    #[serde(flatten)]
    pub core: TaskCore,
    #[serde(default)]
    pub common_variants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Display order, lowest first.
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Touchpoint {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataArtifact {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// Worked product example composed of taxonomy tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
}
