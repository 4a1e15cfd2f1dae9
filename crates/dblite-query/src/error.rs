//! Error types for criteria construction and translation.

use thiserror::Error;

/// The error type for dblite-query operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller-supplied filter input is malformed.
    ///
    /// Raised for bad field names, unknown operator keys, and operands whose
    /// shape does not fit their operator.
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// An operator reached a rendering path that cannot express it.
    ///
    /// Criteria built through [`crate::build_criteria`] never trigger this;
    /// seeing it means the model and the translator disagree.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidCriteria(message.into())
    }
}

/// A specialized Result type for dblite-query operations.
pub type Result<T> = std::result::Result<T, Error>;
