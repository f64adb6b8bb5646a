//! Project library use-case service.
//!
//! # Responsibility
//! - Create, rename, import and export builder projects.
//! - Run every imported file through the full validation pipeline before saving.
//!
//! # Invariants
//! - Project names are sanitized before they are stored.
//! - An import either saves one fully valid project or changes nothing.
//! - Service layer remains storage-agnostic.

use crate::model::project::Project;
use crate::repo::project_repo::{ProjectRepository, RepoError, SaveOutcome};
use crate::validation::{
    parse_project, sanitize_string, validate_file, validate_json, FileCandidate, ValidationError,
    ValidationErrorKind, DEFAULT_MAX_LENGTH,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Service error for project use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Input failed file, JSON or project validation.
    Validation(ValidationError),
    /// Target project does not exist.
    ProjectNotFound(String),
    /// Reading an import file failed after validation passed.
    Io { path: PathBuf, message: String },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Serializing a project for export failed.
    Export(String),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Io { path, message } => {
                write!(f, "failed to read `{}`: {message}", path.display())
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(message) => write!(f, "failed to export project: {message}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            RepoError::Rejected(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ProjectServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedProject {
    pub project: Project,
    pub outcome: SaveOutcome,
}

/// Use-case service wrapper for the project library.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates and saves an empty project.
    ///
    /// # Contract
    /// - Name is sanitized; an empty result is `InvalidProjectName`.
    /// - Id is a fresh UUID v4, `last_modified` is the current time.
    pub fn create_project(&self, name: &str) -> ProjectServiceResult<Project> {
        let name = clean_name(name)?;
        let project = Project::new(name);
        self.repo.save_project(&project)?;
        Ok(project)
    }

    /// Renames a project and refreshes its modification time.
    pub fn rename_project(&self, id: &str, name: &str) -> ProjectServiceResult<Project> {
        let name = clean_name(name)?;
        let mut project = self
            .repo
            .get_project(id)?
            .ok_or_else(|| ProjectServiceError::ProjectNotFound(id.to_string()))?;
        project.name = name;
        project.touch();
        self.repo.save_project(&project)?;
        Ok(project)
    }

    /// Imports one project file.
    ///
    /// # Contract
    /// - Order: file checks, read, JSON parse, project validation, save.
    /// - A missing file is reported as `NoFile`.
    /// - The imported name is sanitized like a created one.
    /// - A project with an existing id replaces the stored one.
    pub fn import_file(&self, path: impl AsRef<Path>) -> ProjectServiceResult<ImportedProject> {
        let path = path.as_ref();
        let candidate = match FileCandidate::from_path(path) {
            Ok(candidate) => Some(candidate),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(io_error(path, &err)),
        };
        validate_file(candidate.as_ref()).map_err(log_rejected)?;

        let text = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == ErrorKind::InvalidData {
                ProjectServiceError::Validation(ValidationError::new(
                    ValidationErrorKind::InvalidJson,
                    err.to_string(),
                ))
            } else {
                io_error(path, &err)
            }
        })?;
        let value = validate_json(&text).map_err(log_rejected)?;
        let mut project = parse_project(value).map_err(log_rejected)?;
        project.name = clean_name(&project.name).map_err(log_rejected)?;

        let outcome = self.repo.save_project(&project)?;
        info!(
            "event=project_import module=service status=ok outcome={:?} size_bytes={}",
            outcome,
            text.len()
        );
        Ok(ImportedProject { project, outcome })
    }

    /// Serializes a stored project as pretty-printed JSON.
    pub fn export_project(&self, id: &str) -> ProjectServiceResult<String> {
        let project = self
            .repo
            .get_project(id)?
            .ok_or_else(|| ProjectServiceError::ProjectNotFound(id.to_string()))?;
        serde_json::to_string_pretty(&project)
            .map_err(|err| ProjectServiceError::Export(err.to_string()))
    }

    pub fn list_projects(&self) -> ProjectServiceResult<Vec<Project>> {
        Ok(self.repo.list_projects()?)
    }

    pub fn get_project(&self, id: &str) -> ProjectServiceResult<Option<Project>> {
        Ok(self.repo.get_project(id)?)
    }

    /// Saves a project as-is (insert or overwrite by id).
    pub fn save_project(&self, project: &Project) -> ProjectServiceResult<SaveOutcome> {
        Ok(self.repo.save_project(project)?)
    }

    pub fn delete_project(&self, id: &str) -> ProjectServiceResult<()> {
        Ok(self.repo.delete_project(id)?)
    }
}

fn clean_name(name: &str) -> Result<String, ValidationError> {
    let name = sanitize_string(name, DEFAULT_MAX_LENGTH);
    if name.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidProjectName,
            "Project name must not be empty",
        ));
    }
    Ok(name)
}

fn io_error(path: &Path, err: &std::io::Error) -> ProjectServiceError {
    ProjectServiceError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn log_rejected(err: ValidationError) -> ProjectServiceError {
    warn!(
        "event=project_import module=service status=error error_code={}",
        err.kind.code()
    );
    ProjectServiceError::Validation(err)
}
