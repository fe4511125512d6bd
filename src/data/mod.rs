/// Data layer: core types, loading, indexing, name resolution and queries.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (records in source order)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  index    │  Dataset → DrugIndex (drug vocabulary + per-drug results)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ snapshot  │  immutable Dataset + DrugIndex pair, swapped by `store`
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ query / compare  │  lookups built on `resolve` (fuzzy organism names)
///   └─────────────────┘
/// ```

pub mod compare;
pub mod error;
pub mod index;
pub mod loader;
pub mod model;
pub mod query;
pub mod resolve;
pub mod snapshot;
pub mod store;
