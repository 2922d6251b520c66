//! Value objects.
//!
//! Constructors validate their input so the rest of the crate can rely on the
//! invariants without re-checking.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum number of characters in a chat message.
pub const MAX_CONTENT_LENGTH: usize = 4096;

/// Identifier of the ticket a chat room belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(i64);

impl TicketId {
    pub fn new(value: i64) -> Result<Self, ValueObjectError> {
        if value <= 0 {
            return Err(ValueObjectError::InvalidTicketId(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TicketId {
    type Error = ValueObjectError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an account (message author or caller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a persisted chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, ValueObjectError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| ValueObjectError::InvalidMessageId(value.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for MessageId {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one connected client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one Room actor instance.
///
/// Successive rooms for the same ticket get distinct instance ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomInstanceId(Uuid);

impl RoomInstanceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RoomInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text body of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyContent);
        }
        let length = value.chars().count();
        if length > MAX_CONTENT_LENGTH {
            return Err(ValueObjectError::ContentTooLong {
                max: MAX_CONTENT_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role as issued by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    User,
}

impl Role {
    /// Whether this role may moderate messages written by other accounts.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "user" => Ok(Role::User),
            other => Err(ValueObjectError::UnknownRole(other.to_string())),
        }
    }
}

/// Resolved identity of whoever is acting on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub account_id: AccountId,
    pub role: Role,
}

/// Opaque credential presented by a client when it connected.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CallerToken(String);

impl CallerToken {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyToken);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CallerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallerToken(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_id_rejects_non_positive_values() {
        // テスト項目: 0 以下のチケット ID は拒否される
        // given (前提条件):
        let values = [0, -1];

        // when (操作):
        let results: Vec<_> = values.iter().map(|v| TicketId::new(*v)).collect();

        // then (期待する結果):
        assert_eq!(results[0], Err(ValueObjectError::InvalidTicketId(0)));
        assert_eq!(results[1], Err(ValueObjectError::InvalidTicketId(-1)));
        assert_eq!(TicketId::new(42).unwrap().value(), 42);
    }

    #[test]
    fn test_message_id_parse() {
        // テスト項目: UUID 文字列からメッセージ ID を生成でき、不正な文字列は拒否される
        // given (前提条件):
        let generated = MessageId::generate();

        // when (操作):
        let parsed = MessageId::parse(&generated.to_string());
        let invalid = MessageId::parse("not-a-uuid");

        // then (期待する結果):
        assert_eq!(parsed, Ok(generated));
        assert_eq!(
            invalid,
            Err(ValueObjectError::InvalidMessageId("not-a-uuid".to_string()))
        );
    }

    #[test]
    fn test_message_content_rejects_blank() {
        // テスト項目: 空白のみのメッセージは拒否される
        // given (前提条件):
        let content = "   ".to_string();

        // when (操作):
        let result = MessageContent::new(content);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyContent));
    }

    #[test]
    fn test_message_content_length_limit() {
        // テスト項目: 上限ちょうどの長さは許可され、上限を超えると拒否される
        // given (前提条件):
        let at_limit = "あ".repeat(MAX_CONTENT_LENGTH);
        let over_limit = "a".repeat(MAX_CONTENT_LENGTH + 1);

        // when (操作):
        let ok = MessageContent::new(at_limit);
        let err = MessageContent::new(over_limit);

        // then (期待する結果):
        assert!(ok.is_ok());
        assert_eq!(
            err,
            Err(ValueObjectError::ContentTooLong {
                max: MAX_CONTENT_LENGTH,
                actual: MAX_CONTENT_LENGTH + 1,
            })
        );
    }

    #[test]
    fn test_only_admin_is_privileged() {
        // テスト項目: モデレーション権限を持つのは admin のみ
        // given (前提条件):
        let roles = [Role::Admin, Role::Editor, Role::User];

        // when (操作):
        let privileged: Vec<bool> = roles.iter().map(Role::is_privileged).collect();

        // then (期待する結果):
        assert_eq!(privileged, vec![true, false, false]);
    }

    #[test]
    fn test_role_from_str() {
        // テスト項目: 文字列からロールに変換でき、未知のロールは拒否される
        // given (前提条件):

        // when (操作):
        let editor = "editor".parse::<Role>();
        let unknown = "owner".parse::<Role>();

        // then (期待する結果):
        assert_eq!(editor, Ok(Role::Editor));
        assert_eq!(
            unknown,
            Err(ValueObjectError::UnknownRole("owner".to_string()))
        );
    }

    #[test]
    fn test_caller_token_debug_is_redacted() {
        // テスト項目: トークンの Debug 出力に値が含まれない
        // given (前提条件):
        let token = CallerToken::new("secret-token").unwrap();

        // when (操作):
        let debug = format!("{:?}", token);

        // then (期待する結果):
        assert!(!debug.contains("secret"));
        assert_eq!(CallerToken::new("  "), Err(ValueObjectError::EmptyToken));
    }
}
