/// Data layer: core types, loading, and the built-in sample table.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv      sample
///        │                        │
///        ▼                        │
///   ┌──────────┐                  │
///   │  loader  │  parse file ─────┤
///   └──────────┘                  ▼
///                           ┌───────────┐
///                           │  Dataset  │  Vec<Row>, column types
///                           └───────────┘
/// ```

pub mod loader;
pub mod model;
pub mod sample;
