//! Error types for the cleanfi library.

use crate::types::{CanonicalField, ColumnMapping};
use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, cleaning or writing tables.
///
/// Cell-level parse failures are not errors: an unparsable amount or date
/// becomes a missing value and the row is kept.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Rules file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more of Date, Description, Amount could not be matched to a
    /// raw column.
    #[error(
        "Couldn't auto-detect required column(s): {}. Try renaming them in your CSV to common names like 'Date', 'Description', 'Amount'.",
        join_fields(.missing)
    )]
    MissingRequiredColumns {
        missing: Vec<CanonicalField>,
        mapping: ColumnMapping,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}
