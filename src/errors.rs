use std::io;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised while loading records or running the analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("required column '{column}' is missing from {source_name}")]
    Schema { column: String, source_name: String },
    #[error("receipt '{receipt_id}': {field} value '{value}' is not a calendar date")]
    DataFormat {
        receipt_id: String,
        field: &'static str,
        value: String,
    },
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("row {row} of {source_name} has {found} cells, header has {expected}")]
    RaggedRow {
        source_name: String,
        row: u64,
        found: usize,
        expected: usize,
    },
    #[error("invalid input glob: {0}")]
    Glob(#[from] globset::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
