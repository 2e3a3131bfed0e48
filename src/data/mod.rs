/// Data layer: schema, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → StudyTable (year normalised once here)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → filtered StudyTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  counts, top-N + Others, cross tabs, shares, trend
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  DashboardView: every chart's table   ──▶ export (CSV)
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
