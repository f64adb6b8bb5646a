//! Static taxonomy catalog.
//!
//! # Responsibility
//! - Load taxonomy records as structured data (compiled-in or supplied).
//! - Check cross references between records.
//! - Answer read-only lookups by id, layer and relation.
//!
//! # Invariants
//! - A `Catalog` returned by `builtin()` has passed `validate()`.
//! - Lookups never allocate new records; they borrow from the catalog.

pub mod catalog;
pub mod entity;
pub mod references;

pub use catalog::{Catalog, CatalogError, CatalogResult};
pub use entity::{EntityKind, EntityRef, TaskRef};
pub use references::{unresolved_references, UnresolvedReference};
