//! Antibiotic susceptibility matrix: loading, indexing and lookups.
//!
//! The [`data`] layer is shared by the desktop viewer and any other front
//! end. Everything is read-only after a load; see [`data::store::MatrixStore`]
//! for how reloads are published.

pub mod data;

pub use data::compare::{DrugComparison, OrganismComparison};
pub use data::error::{LoadError, QueryError};
pub use data::model::{Dataset, DrugResult, EntityKind, Record, Stats, UNKNOWN_SENSITIVITY};
pub use data::query::Entity;
pub use data::snapshot::Snapshot;
pub use data::store::MatrixStore;
