//! Domain records for builder projects and the static taxonomy.
//!
//! # Responsibility
//! - Define the typed shapes that validated JSON is converted into.
//! - Keep wire naming (`camelCase` for projects, `snake_case` for the
//!   taxonomy) in one place.
//!
//! # Invariants
//! - Project records only exist after passing `validation::project`.
//! - Taxonomy records are immutable once a `Catalog` is built.

pub mod project;
pub mod taxonomy;
