//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A filter or lookup referenced a field the record does not have.
    #[error("field `{field}` not found on record `{id}`")]
    FieldNotFound { field: String, id: String },

    /// A field exists but holds a value the caller cannot use.
    #[error("invalid value for field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("failed to read data file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file {} is not a valid document: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
