use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a source file into a [`StudyTable`](super::model::StudyTable).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON: {0}")]
    InvalidJson(String),
}

/// An operation that needs at least one row was handed an empty result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no data available for the selected filters")]
pub struct NoDataError;

/// A column identifier outside the known schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column: {0:?}")]
pub struct UnknownColumn(pub String);

/// Failure while serialising a table to CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing export: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
}
