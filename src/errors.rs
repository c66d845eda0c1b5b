//! Error taxonomy for the migration.
//!
//! Each step of a single object's move (decode, copy, delete) reports its own
//! error kind so the migrator can log and continue on exactly those failures
//! and nothing else.

use thiserror::Error;

/// Fatal, pre-flight problems with the command-line arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Fingerprint folder must end with a slash")]
    FolderMissingTrailingSlash,
}

/// A key that could not be turned back into a fingerprint identifier.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("`{key}` is not valid hex: {source}")]
    InvalidHex {
        key: String,
        #[source]
        source: hex::FromHexError,
    },
    #[error("`{key}` does not decode to UTF-8 text: {source}")]
    InvalidUtf8 {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("`{key}` is not inside folder `{folder}`")]
    OutsideFolder { folder: String, key: String },
    #[error("`{key}` does not end with suffix `{suffix}`")]
    MissingSuffix { key: String, suffix: &'static str },
    #[error("`{key}` does not percent-decode to UTF-8 text")]
    InvalidPercentEncoding { key: String },
}

/// Errors raised by the object store backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The requested object was not found (HTTP 404).
    #[error("object not found: {key}")]
    NotFound { key: String },

    /// Access denied (HTTP 403).
    #[error("access denied to bucket `{bucket}`")]
    AccessDenied { bucket: String },

    /// Failed to reach the store endpoint.
    #[error("connection error: {0}")]
    Connection(String),

    /// Catch-all for other S3 errors.
    #[error("S3 error: {0}")]
    S3(String),
}

/// Failure of one object's move, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("copy to `{destination}` failed: {source}")]
    Copy {
        destination: String,
        #[source]
        source: StoreError,
    },
    /// The copy already landed, so both keys now exist.
    #[error("delete failed after copy to `{destination}`: {source}")]
    Delete {
        destination: String,
        #[source]
        source: StoreError,
    },
}

/// Errors that end the whole run.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("listing objects failed: {0}")]
    Listing(#[source] StoreError),
    #[error("writing report failed: {0}")]
    Output(#[from] std::io::Error),
}
