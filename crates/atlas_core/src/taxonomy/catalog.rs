//! Catalog loading, cross-reference validation and lookups.

use crate::model::taxonomy::{
    AiTask, Constraint, DataArtifact, Example, HumanTask, Layer, Relation, SystemTask, TaskCore,
    TaskType, Touchpoint,
};
use crate::taxonomy::entity::{EntityKind, EntityRef, TaskRef};
use log::{error, info};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BUILTIN_CATALOG_JSON: &str = include_str!("../../data/catalog.json");

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern must compile")
});

static BUILTIN: OnceCell<Catalog> = OnceCell::new();

pub type CatalogResult<T> = Result<T, CatalogError>;

/// First problem found while loading or validating a catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Parse(String),
    DuplicateId(String),
    InvalidSlug { id: String, slug: String },
    UnknownLayer { task_id: String, layer_id: String },
    TaskTypeMismatch {
        task_id: String,
        expected: TaskType,
        found: TaskType,
    },
    UnknownArtifact { task_id: String, artifact_id: String },
    UnknownRelationTarget { source_id: String, target_id: String },
    StrengthOutOfRange {
        source_id: String,
        target_id: String,
        strength: f64,
    },
    UnknownExampleTask { example_id: String, task_id: String },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "catalog is not valid JSON: {message}"),
            Self::DuplicateId(id) => write!(f, "duplicate catalog id `{id}`"),
            Self::InvalidSlug { id, slug } => {
                write!(f, "`{id}` has invalid slug `{slug}`")
            }
            Self::UnknownLayer { task_id, layer_id } => {
                write!(f, "task `{task_id}` references unknown layer `{layer_id}`")
            }
            Self::TaskTypeMismatch {
                task_id,
                expected,
                found,
            } => write!(
                f,
                "task `{task_id}` is listed as {} but declares task_type {}",
                expected.as_str(),
                found.as_str()
            ),
            Self::UnknownArtifact {
                task_id,
                artifact_id,
            } => write!(
                f,
                "task `{task_id}` references unknown data artifact `{artifact_id}`"
            ),
            Self::UnknownRelationTarget {
                source_id,
                target_id,
            } => write!(
                f,
                "relation from `{source_id}` targets unknown entry `{target_id}`"
            ),
            Self::StrengthOutOfRange {
                source_id,
                target_id,
                strength,
            } => write!(
                f,
                "relation `{source_id}` -> `{target_id}` has strength {strength} outside [0, 1]"
            ),
            Self::UnknownExampleTask {
                example_id,
                task_id,
            } => write!(
                f,
                "example `{example_id}` references unknown task `{task_id}`"
            ),
        }
    }
}

impl Error for CatalogError {}

/// The full set of taxonomy records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub ai_tasks: Vec<AiTask>,
    #[serde(default)]
    pub human_tasks: Vec<HumanTask>,
    #[serde(default)]
    pub system_tasks: Vec<SystemTask>,
    #[serde(default)]
    pub touchpoints: Vec<Touchpoint>,
    #[serde(default)]
    pub data_artifacts: Vec<DataArtifact>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub examples: Vec<Example>,
}

impl Catalog {
    /// Returns the compiled-in catalog, parsed and validated on first use.
    pub fn builtin() -> CatalogResult<&'static Catalog> {
        BUILTIN.get_or_try_init(|| {
            let catalog = Self::from_json(BUILTIN_CATALOG_JSON).map_err(|err| {
                error!("event=catalog_load module=taxonomy status=error source=builtin");
                err
            })?;
            info!(
                "event=catalog_load module=taxonomy status=ok source=builtin entities={}",
                catalog.entity_count()
            );
            Ok(catalog)
        })
    }

    /// Parses and validates a catalog document.
    pub fn from_json(text: &str) -> CatalogResult<Self> {
        let catalog: Self =
            serde_json::from_str(text).map_err(|err| CatalogError::Parse(err.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks record-level and cross-record invariants, stopping at the first violation.
    pub fn validate(&self) -> CatalogResult<()> {
        let mut seen = BTreeSet::new();
        for entity in self.entities() {
            if !seen.insert(entity.id()) {
                return Err(CatalogError::DuplicateId(entity.id().to_string()));
            }
            if !SLUG_PATTERN.is_match(entity.slug()) {
                return Err(CatalogError::InvalidSlug {
                    id: entity.id().to_string(),
                    slug: entity.slug().to_string(),
                });
            }
        }

        for task in self.tasks() {
            self.validate_task(task, &seen)?;
        }

        for example in &self.examples {
            if let Some(missing) = example
                .task_ids
                .iter()
                .find(|task_id| self.task(task_id).is_none())
            {
                return Err(CatalogError::UnknownExampleTask {
                    example_id: example.id.clone(),
                    task_id: missing.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_task(&self, task: TaskRef<'_>, ids: &BTreeSet<&str>) -> CatalogResult<()> {
        let core = task.core();
        if core.task_type != task.expected_type() {
            return Err(CatalogError::TaskTypeMismatch {
                task_id: core.id.clone(),
                expected: task.expected_type(),
                found: core.task_type,
            });
        }
        if self.layer(&core.layer_id).is_none() {
            return Err(CatalogError::UnknownLayer {
                task_id: core.id.clone(),
                layer_id: core.layer_id.clone(),
            });
        }
        if let Some(io_ref) = core
            .io_spec
            .all_refs()
            .find(|io_ref| self.data_artifact(&io_ref.artifact_id).is_none())
        {
            return Err(CatalogError::UnknownArtifact {
                task_id: core.id.clone(),
                artifact_id: io_ref.artifact_id.clone(),
            });
        }
        for relation in &core.relations {
            if !ids.contains(relation.target_id.as_str()) {
                return Err(CatalogError::UnknownRelationTarget {
                    source_id: core.id.clone(),
                    target_id: relation.target_id.clone(),
                });
            }
            if !(0.0..=1.0).contains(&relation.strength) {
                return Err(CatalogError::StrengthOutOfRange {
                    source_id: core.id.clone(),
                    target_id: relation.target_id.clone(),
                    strength: relation.strength,
                });
            }
        }
        Ok(())
    }

    /// Iterates every record in a stable order: layers, tasks (ai, human,
    /// system), touchpoints, data artifacts, constraints, examples.
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.layers
            .iter()
            .map(EntityRef::Layer)
            .chain(self.tasks().map(EntityRef::Task))
            .chain(self.touchpoints.iter().map(EntityRef::Touchpoint))
            .chain(self.data_artifacts.iter().map(EntityRef::DataArtifact))
            .chain(self.constraints.iter().map(EntityRef::Constraint))
            .chain(self.examples.iter().map(EntityRef::Example))
    }

    pub fn entity_count(&self) -> usize {
        self.entities().count()
    }

    /// Number of records of `kind`.
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities().filter(|entity| entity.kind() == kind).count()
    }

    pub fn tasks(&self) -> impl Iterator<Item = TaskRef<'_>> {
        self.ai_tasks
            .iter()
            .map(TaskRef::Ai)
            .chain(self.human_tasks.iter().map(TaskRef::Human))
            .chain(self.system_tasks.iter().map(TaskRef::System))
    }

    pub fn entity(&self, id: &str) -> Option<EntityRef<'_>> {
        self.entities().find(|entity| entity.id() == id)
    }

    pub fn task(&self, id: &str) -> Option<TaskRef<'_>> {
        self.tasks().find(|task| task.core().id == id)
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn data_artifact(&self, id: &str) -> Option<&DataArtifact> {
        self.data_artifacts.iter().find(|artifact| artifact.id == id)
    }

    /// Layers sorted by their display order.
    pub fn ordered_layers(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by_key(|layer| (layer.order, layer.id.as_str()));
        layers
    }

    pub fn tasks_in_layer<'a>(&'a self, layer_id: &'a str) -> impl Iterator<Item = TaskRef<'a>> {
        self.tasks()
            .filter(move |task| task.core().layer_id == layer_id)
    }

    /// Outgoing relations of the task `id`; empty for unknown ids and non-tasks.
    pub fn relations_from(&self, id: &str) -> &[Relation] {
        self.task(id)
            .map(|task| task.core().relations.as_slice())
            .unwrap_or_default()
    }

    /// Incoming relations targeting `id`, paired with the task declaring them.
    pub fn relations_to<'a>(&'a self, id: &'a str) -> Vec<(&'a TaskCore, &'a Relation)> {
        self.tasks()
            .flat_map(|task| {
                let core = task.core();
                core.relations.iter().map(move |relation| (core, relation))
            })
            .filter(|(_, relation)| relation.target_id == id)
            .collect()
    }
}
