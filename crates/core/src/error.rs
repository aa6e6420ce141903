//! Domain error model.

use thiserror::Error;

/// Result type used across the rule layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type returned by repository ports.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a persistence collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint (e.g. name) rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other storage fault (connectivity, decoding, constraint, ...).
    #[error("storage failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unique(msg: impl Into<String>) -> Self {
        Self::UniqueViolation(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Rule-layer error.
///
/// The first four variants are recoverable outcomes the caller can act on.
/// `Store` carries anything the rule layer does not recover from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input (including a search with no filters).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced product or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A unique name is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requester is not allowed to perform the action.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Unrecovered persistence failure.
    #[error(transparent)]
    Store(StoreError),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Message carried by the error, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(m) | Self::NotFound(m) | Self::Conflict(m) | Self::Unauthorized(m) => {
                m.clone()
            }
            Self::Store(e) => e.to_string(),
        }
    }
}

/// A late unique violation from the store is the same outcome as a failed
/// pre-check: the name is taken.
impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => Self::Conflict(msg),
            other => Self::Store(other),
        }
    }
}
