//! Domain errors.

use thiserror::Error;

/// Validation failures raised by value object constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("ticket id must be positive, got {0}")]
    InvalidTicketId(i64),
    #[error("invalid message id '{0}'")]
    InvalidMessageId(String),
    #[error("message content must not be empty")]
    EmptyContent,
    #[error("message content exceeds {max} characters (got {actual})")]
    ContentTooLong { max: usize, actual: usize },
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("caller token must not be empty")]
    EmptyToken,
}

/// Failures reported by a `MessageRepository`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("message {0} not found")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Failures reported by an `IdentityProvider`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("unauthorized")]
    Unauthenticated,
}
