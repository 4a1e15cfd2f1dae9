//! Error types for dblite storage operations.

use std::io;
use thiserror::Error;

/// The error type for dblite storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filter input could not be turned into criteria.
    #[error(transparent)]
    Criteria(#[from] dblite_query::Error),

    /// The connection URI is malformed or names an unknown backend.
    #[error("invalid URI: {0}")]
    Uri(String),

    /// The field set of the stored item type is unusable.
    #[error("schema error: {0}")]
    Schema(String),

    /// A record cannot be written as given.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// An update addressed an identity that is not stored.
    #[error("no record with _id {0}")]
    RecordNotFound(i64),

    /// A delete was requested without criteria.
    #[error("criteria is not defined; use delete_all() to remove every record")]
    MissingCriteria,

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or arguments.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A specialized Result type for dblite operations.
pub type Result<T> = std::result::Result<T, Error>;
