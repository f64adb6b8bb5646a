//! Borrowed views over heterogeneous catalog records.

use crate::model::taxonomy::{
    AiTask, Constraint, DataArtifact, Example, HumanTask, Layer, SystemTask, TaskCore, TaskType,
    Touchpoint,
};

/// Kind of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Layer,
    AiTask,
    HumanTask,
    SystemTask,
    Touchpoint,
    DataArtifact,
    Constraint,
    Example,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        Self::Layer,
        Self::AiTask,
        Self::HumanTask,
        Self::SystemTask,
        Self::Touchpoint,
        Self::DataArtifact,
        Self::Constraint,
        Self::Example,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Layer => "layer",
            Self::AiTask => "ai_task",
            Self::HumanTask => "human_task",
            Self::SystemTask => "system_task",
            Self::Touchpoint => "touchpoint",
            Self::DataArtifact => "data_artifact",
            Self::Constraint => "constraint",
            Self::Example => "example",
        }
    }

    /// URL path segment for detail pages of this kind.
    pub fn route_segment(self) -> &'static str {
        match self {
            Self::Layer => "layers",
            Self::AiTask => "ai-tasks",
            Self::HumanTask => "human-tasks",
            Self::SystemTask => "system-tasks",
            Self::Touchpoint => "touchpoints",
            Self::DataArtifact => "data-artifacts",
            Self::Constraint => "constraints",
            Self::Example => "examples",
        }
    }

    pub fn is_task(self) -> bool {
        matches!(self, Self::AiTask | Self::HumanTask | Self::SystemTask)
    }
}

/// Any task record, regardless of who performs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskRef<'a> {
    Ai(&'a AiTask),
    Human(&'a HumanTask),
    System(&'a SystemTask),
}

impl<'a> TaskRef<'a> {
    pub fn core(self) -> &'a TaskCore {
        match self {
            Self::Ai(task) => &task.core,
            Self::Human(task) => &task.core,
            Self::System(task) => &task.core,
        }
    }

    /// Task type implied by the collection the record was loaded from.
    pub fn expected_type(self) -> TaskType {
        match self {
            Self::Ai(_) => TaskType::Ai,
            Self::Human(_) => TaskType::Human,
            Self::System(_) => TaskType::System,
        }
    }

    pub fn kind(self) -> EntityKind {
        match self {
            Self::Ai(_) => EntityKind::AiTask,
            Self::Human(_) => EntityKind::HumanTask,
            Self::System(_) => EntityKind::SystemTask,
        }
    }
}

/// Any catalog record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Layer(&'a Layer),
    Task(TaskRef<'a>),
    Touchpoint(&'a Touchpoint),
    DataArtifact(&'a DataArtifact),
    Constraint(&'a Constraint),
    Example(&'a Example),
}

impl<'a> EntityRef<'a> {
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Layer(_) => EntityKind::Layer,
            Self::Task(task) => task.kind(),
            Self::Touchpoint(_) => EntityKind::Touchpoint,
            Self::DataArtifact(_) => EntityKind::DataArtifact,
            Self::Constraint(_) => EntityKind::Constraint,
            Self::Example(_) => EntityKind::Example,
        }
    }

    pub fn id(self) -> &'a str {
        match self {
            Self::Layer(layer) => &layer.id,
            Self::Task(task) => &task.core().id,
            Self::Touchpoint(touchpoint) => &touchpoint.id,
            Self::DataArtifact(artifact) => &artifact.id,
            Self::Constraint(constraint) => &constraint.id,
            Self::Example(example) => &example.id,
        }
    }

    pub fn name(self) -> &'a str {
        match self {
            Self::Layer(layer) => &layer.name,
            Self::Task(task) => &task.core().name,
            Self::Touchpoint(touchpoint) => &touchpoint.name,
            Self::DataArtifact(artifact) => &artifact.name,
            Self::Constraint(constraint) => &constraint.name,
            Self::Example(example) => &example.name,
        }
    }

    pub fn slug(self) -> &'a str {
        match self {
            Self::Layer(layer) => &layer.slug,
            Self::Task(task) => &task.core().slug,
            Self::Touchpoint(touchpoint) => &touchpoint.slug,
            Self::DataArtifact(artifact) => &artifact.slug,
            Self::Constraint(constraint) => &constraint.slug,
            Self::Example(example) => &example.slug,
        }
    }

    /// Human-readable summary; tasks use their elevator pitch.
    pub fn description(self) -> &'a str {
        match self {
            Self::Layer(layer) => &layer.description,
            Self::Task(task) => &task.core().elevator_pitch,
            Self::Touchpoint(touchpoint) => &touchpoint.description,
            Self::DataArtifact(artifact) => &artifact.description,
            Self::Constraint(constraint) => &constraint.description,
            Self::Example(example) => &example.description,
        }
    }

    pub fn as_task(self) -> Option<TaskRef<'a>> {
        match self {
            Self::Task(task) => Some(task),
            _ => None,
        }
    }
}
