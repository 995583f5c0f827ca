//! Error types for the dataset crate.
//!
//! Every variant signals a caller error (bad id, missing setup, malformed
//! input). Nothing here is transient, so nothing is retried.

use crate::types::{InnerId, RawId};
use thiserror::Error;

/// Errors raised while ingesting ratings or querying a trainset
///
/// Rust concept: The `#[derive(Error)]` macro from thiserror implements
/// `std::error::Error` and `Display` from the `#[error(...)]` attributes
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Raw id never seen during ingestion, or absent from an info table
    #[error("{entity} {id} is not part of the trainset")]
    UnknownEntity { entity: String, id: RawId },

    /// Inner id outside `[0, n)` for its entity kind
    #[error("{id} is not a valid inner {entity} id")]
    InvalidInnerId { entity: String, id: InnerId },

    /// Info requested for an entity kind with no attached table
    #[error("no info table attached for {entity}s")]
    MissingInfoTable { entity: String },

    /// Global mean requested on a trainset holding zero ratings
    #[error("trainset holds no ratings")]
    EmptyTrainset,

    /// Requested field is not a column of the info table
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// Column name not present in a table
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    /// Key column holds the same id twice
    #[error("duplicate key {id} in column {column}")]
    DuplicateKey { column: String, id: RawId },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a row doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Line in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DatasetError>;
