//! CSV port error types.

use std::fmt;

/// Errors raised by CSV ingest and export.
///
/// Per-row ingest failures are not errors at this level; they are
/// collected into the import report and ingest continues.
#[derive(Debug)]
#[non_exhaustive]
pub enum CsvError {
    /// An I/O error while reading or writing.
    Io {
        /// The underlying I/O error message.
        message: String,
    },

    /// A CSV-level parse or write error.
    Csv {
        /// The underlying error message.
        message: String,
    },

    /// The header row is missing required columns.
    MissingColumns {
        /// The required columns that were not found.
        columns: Vec<String>,
    },
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvError::Io { message } => write!(f, "I/O error: {message}"),
            CsvError::Csv { message } => write!(f, "CSV error: {message}"),
            CsvError::MissingColumns { columns } => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
        }
    }
}

impl std::error::Error for CsvError {}

impl From<std::io::Error> for CsvError {
    fn from(err: std::io::Error) -> Self {
        CsvError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::Csv {
            message: err.to_string(),
        }
    }
}
