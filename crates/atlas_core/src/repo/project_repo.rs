//! Project repository contracts and storage-port implementation.
//!
//! # Invariants
//! - All projects live as one JSON array under a single storage key.
//! - `save_project` overwrites by `id`; no duplicate ids are ever stored.
//! - A corrupt or invalid stored array is reported, never silently reset.
//! - A project is written only if its serialized form passes `validate_project`.

use crate::model::project::Project;
use crate::persistence::{safe_parse_storage, safe_save_storage, PersistenceError};
use crate::storage::StoragePort;
use crate::validation::{validate_project, validate_projects_array, ValidationError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the saved project array.
pub const PROJECTS_STORAGE_KEY: &str = "atlas-projects";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Persistence(PersistenceError),
    NotFound(String),
    /// The project would not survive a read back, e.g. a non-finite coordinate.
    Rejected(ValidationError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::Rejected(err) => write!(f, "project rejected: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Rejected(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<PersistenceError> for RepoError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Whether a save created a new entry or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Replaced,
}

/// Repository interface for saved projects.
pub trait ProjectRepository {
    /// Lists projects, most recently modified first, ties broken by id.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    fn get_project(&self, id: &str) -> RepoResult<Option<Project>>;
    fn save_project(&self, project: &Project) -> RepoResult<SaveOutcome>;
    fn delete_project(&self, id: &str) -> RepoResult<()>;
}

/// Project repository persisting through any [`StoragePort`].
pub struct StorageProjectRepository<S: StoragePort> {
    storage: S,
    key: String,
}

impl<S: StoragePort> StorageProjectRepository<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, PROJECTS_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    fn load(&self) -> RepoResult<Vec<Project>> {
        let projects = safe_parse_storage::<Vec<Project>, _, _>(
            &self.storage,
            &self.key,
            validate_projects_array,
        )?;
        Ok(projects.unwrap_or_default())
    }

    fn store(&self, projects: &[Project]) -> RepoResult<()> {
        safe_save_storage(&self.storage, &self.key, projects)?;
        Ok(())
    }
}

impl<S: StoragePort> ProjectRepository for StorageProjectRepository<S> {
    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut projects = self.load()?;
        projects.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(projects)
    }

    fn get_project(&self, id: &str) -> RepoResult<Option<Project>> {
        Ok(self.load()?.into_iter().find(|project| project.id == id))
    }

    fn save_project(&self, project: &Project) -> RepoResult<SaveOutcome> {
        check_writable(project)?;
        let mut projects = self.load()?;
        let outcome = match projects.iter_mut().find(|existing| existing.id == project.id) {
            Some(existing) => {
                *existing = project.clone();
                SaveOutcome::Replaced
            }
            None => {
                projects.push(project.clone());
                SaveOutcome::Created
            }
        };
        self.store(&projects)?;
        info!(
            "event=project_save module=repo status=ok outcome={:?} nodes={} edges={} personas={}",
            outcome,
            project.data.nodes.len(),
            project.data.edges.len(),
            project.data.personas.len()
        );
        Ok(outcome)
    }

    fn delete_project(&self, id: &str) -> RepoResult<()> {
        let mut projects = self.load()?;
        let before = projects.len();
        projects.retain(|project| project.id != id);
        if projects.len() == before {
            return Err(RepoError::NotFound(id.to_string()));
        }
        self.store(&projects)?;
        info!("event=project_delete module=repo status=ok remaining={}", projects.len());
        Ok(())
    }
}

/// Non-finite floats serialize as `null`, which the read path rejects.
fn check_writable(project: &Project) -> RepoResult<()> {
    let document = serde_json::to_value(project).map_err(|err| {
        RepoError::Persistence(PersistenceError::SaveFailure {
            message: err.to_string(),
        })
    })?;
    validate_project(&document).map_err(|err| {
        warn!(
            "event=project_save module=repo status=error error_code={}",
            err.kind.code()
        );
        RepoError::Rejected(err)
    })
}
