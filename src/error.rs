//! Error types for the report pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Fatal errors that abort a run.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Failed to open, read, or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV layer error at the I/O boundary
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configured delimiter does not fit in a single byte
    #[error("delimiter must be a single-byte character, got {0:?}")]
    Delimiter(char),
}

/// Row-local parse failures.
///
/// These never abort the run: the offending record is reported through the
/// skip logger and processing continues with the next record.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Raw record has the wrong number of tokens
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    /// A single field failed its converter
    #[error("cannot convert {value:?} for field {field:?} using the {converter} converter")]
    FieldConversion {
        field: &'static str,
        converter: &'static str,
        value: String,
    },
}

impl ParseError {
    pub(crate) fn conversion(field: &'static str, converter: &'static str, value: &str) -> Self {
        ParseError::FieldConversion {
            field,
            converter,
            value: value.to_owned(),
        }
    }
}
