//! UseCase errors.

use thiserror::Error;

use crate::domain::{IdentityError, RepositoryError, TicketId, ValueObjectError};

/// Failure of an in-room action. Reported to the sender only; never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Malformed or invalid request payload
    #[error("invalid request: {0}")]
    Protocol(String),
    #[error("unauthorized")]
    Unauthenticated,
    /// Caller is neither the author nor privileged
    #[error("forbidden: only the author or an admin may modify this message")]
    Forbidden,
    #[error("message {0} not found")]
    NotFound(String),
    #[error("failed to persist message: {0}")]
    Persistence(String),
}

impl From<ValueObjectError> for ActionError {
    fn from(err: ValueObjectError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<IdentityError> for ActionError {
    fn from(_: IdentityError) -> Self {
        Self::Unauthenticated
    }
}

impl From<RepositoryError> for ActionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::NotFound(id),
            RepositoryError::Storage(reason) => Self::Persistence(reason),
        }
    }
}

/// Failure to attach a connection to a ticket's chat room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceptError {
    #[error("unauthorized")]
    Unauthenticated,
    #[error("chat room for ticket {0} is unavailable")]
    RoomUnavailable(TicketId),
}

/// Failure of the message history query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetMessagesError {
    #[error("unauthorized")]
    Unauthenticated,
    #[error("failed to load messages: {0}")]
    Persistence(String),
}

impl From<IdentityError> for GetMessagesError {
    fn from(_: IdentityError) -> Self {
        Self::Unauthenticated
    }
}

impl From<RepositoryError> for GetMessagesError {
    fn from(err: RepositoryError) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_maps_to_action_error() {
        // テスト項目: Repository のエラーが NotFound / Persistence に振り分けられる
        // given (前提条件):
        let not_found = RepositoryError::NotFound("abc".to_string());
        let storage = RepositoryError::Storage("disk full".to_string());

        // when (操作):
        let not_found: ActionError = not_found.into();
        let storage: ActionError = storage.into();

        // then (期待する結果):
        assert_eq!(not_found, ActionError::NotFound("abc".to_string()));
        assert_eq!(storage, ActionError::Persistence("disk full".to_string()));
        assert_eq!(not_found.to_string(), "message abc not found");
    }

    #[test]
    fn test_value_object_error_is_protocol_error() {
        // テスト項目: 値オブジェクトの検証エラーはプロトコルエラーとして扱われる
        // given (前提条件):
        let err = ValueObjectError::EmptyContent;

        // when (操作):
        let action_error: ActionError = err.into();

        // then (期待する結果):
        assert_eq!(
            action_error.to_string(),
            "invalid request: message content must not be empty"
        );
    }
}
