/// Data layer: core types, loading, normalization, and the published-data
/// registry.
///
/// Architecture:
/// ```text
///  literal tables        .out / .txt / .csv
///       │                       │
///       │                 ┌──────────┐
///       │                 │  loader   │  parse file → RawTable
///       │                 └──────────┘
///       ▼                       ▼
///  ┌───────────────────────────────────┐
///  │            normalize               │  unit recipe + decade correction
///  └───────────────────────────────────┘
///       │                       │
///       ▼                       ▼
///  ┌──────────┐          ┌──────────┐
///  │ registry  │          │  models   │  Series / BandSeries / points
///  └──────────┘          └──────────┘
///            (base units from here on)
/// ```
pub mod interp;
pub mod loader;
pub mod model;
pub mod models;
pub mod normalize;
pub mod registry;
