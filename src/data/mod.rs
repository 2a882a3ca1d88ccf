/// Metadata layer: table types, CSV loading, and row filtering.
///
/// Architecture:
/// ```text
///  ptbxl_database.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → MetadataTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ MetadataTable  │  rows keyed by ecg_id, typed cells
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply metadata predicates → row positions
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
