//! Repository layer over the storage port.
//!
//! # Responsibility
//! - Define use-case oriented project access contracts.
//! - Keep storage keys and array layout inside core.
//!
//! # Invariants
//! - Every read validates the whole stored array before returning anything.
//! - Writes go through `persistence::safe_save_storage`.

pub mod project_repo;
