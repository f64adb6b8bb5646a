//! Core domain logic for the AI Interaction Atlas.
//! This crate owns project validation, guarded persistence and the taxonomy catalog.

pub mod config;
pub mod db;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod service;
pub mod storage;
pub mod taxonomy;
pub mod validation;

pub use config::{AtlasConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use metadata::{build_route_metadata, render_metadata_json, RouteMeta};
pub use model::project::{
    BuilderEdge, BuilderNode, NodeType, Persona, PersonaCategory, Project, ProjectData,
};
pub use persistence::{
    remove_storage, safe_parse_storage, safe_save_storage, PersistenceError, PersistenceResult,
};
pub use repo::project_repo::{
    ProjectRepository, RepoError, RepoResult, SaveOutcome, StorageProjectRepository,
    PROJECTS_STORAGE_KEY,
};
pub use service::feedback_service::{
    compose_feedback, Clipboard, FeedbackCategory, FeedbackError, FeedbackOutcome,
    FeedbackPayload, FeedbackService, FeedbackTransport,
};
pub use service::project_service::{
    ImportedProject, ProjectService, ProjectServiceError, ProjectServiceResult,
};
pub use storage::{MemoryStorage, SqliteStorage, StorageError, StoragePort, StorageResult};
pub use taxonomy::{unresolved_references, Catalog, CatalogError, EntityKind, EntityRef};
pub use validation::{
    sanitize_string, sanitize_value, validate_file, validate_json, validate_project,
    validate_projects_array, FileCandidate, ValidationError, ValidationErrorKind,
    ValidationReport, ValidationResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
