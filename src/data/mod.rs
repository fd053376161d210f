/// Data layer: core types, loading, cleaning and export.
///
/// Architecture:
/// ```text
///  .csv / .xls / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  extension → FileFormat → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ cleaning │  remove duplicates, fill numeric gaps with the mean
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ selection │  keep / reorder columns
///   └───────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌────────┐
///   │  export  │   │ chart  │  first five numeric columns
///   └──────────┘   └────────┘
///   CSV / XLSX bytes
/// ```

pub mod chart;
pub mod cleaning;
pub mod error;
pub mod export;
pub mod format;
pub mod loader;
pub mod model;
pub mod selection;
