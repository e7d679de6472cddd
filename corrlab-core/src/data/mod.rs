//! Data sources and alignment.

pub mod align;
pub mod ingest;
pub mod synthetic;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::SeriesError;

pub use align::{align, common_dates};
pub use ingest::{load_csv_universe, read_csv_universe};
pub use synthetic::synthetic_universe;

/// Errors raised while loading a series universe.
///
/// `MissingColumns` is a configuration error: it aborts the run before any
/// analysis starts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing columns in CSV: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("CSV has no '{}' column", ingest::DATE_COLUMN)]
    MissingDateColumn,

    #[error("line {line}: unparseable date '{value}'")]
    InvalidDate { line: usize, value: String },

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("duplicate date {0}")]
    DuplicateDate(NaiveDate),

    #[error("reference instrument '{0}' is not in the configured universe")]
    ReferenceNotInUniverse(String),

    #[error(transparent)]
    Series(#[from] SeriesError),
}
