//! WebSocket protocol: inbound action requests and outbound event envelopes.
//!
//! Inbound: `{"action": "create" | "update" | "delete", "payload": {...}}` (`data` is
//! accepted as an alias for `payload`).
//!
//! Outbound: `{"status": "success" | "error", "action": ..., "message": ..., "data": ...}`.

use serde::{Deserialize, Serialize};

/// In-room action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// Envelope status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Inbound action request; the payload is decoded per action.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: Action,
    #[serde(default, alias = "data")]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePayload {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub id: String,
}

/// Wire form of a persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub ticket_id: i64,
    pub author_id: i64,
    pub content: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
    /// RFC 3339 (UTC)
    pub updated_at: String,
}

/// Identity of a deleted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedMessageDto {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeData {
    Message(MessageDto),
    Deleted(DeletedMessageDto),
}

/// Outbound event envelope, broadcast on success or replied to the sender on error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EnvelopeData>,
}

impl Envelope {
    pub fn created(message: MessageDto) -> Self {
        Self {
            status: Status::Success,
            action: Some(Action::Create),
            message: "message created".to_string(),
            data: Some(EnvelopeData::Message(message)),
        }
    }

    pub fn updated(message: MessageDto) -> Self {
        Self {
            status: Status::Success,
            action: Some(Action::Update),
            message: "message updated".to_string(),
            data: Some(EnvelopeData::Message(message)),
        }
    }

    pub fn deleted(id: String) -> Self {
        Self {
            status: Status::Success,
            action: Some(Action::Delete),
            message: "message deleted".to_string(),
            data: Some(EnvelopeData::Deleted(DeletedMessageDto { id })),
        }
    }

    /// Error report for the sender only. `action` is `None` when the request could not
    /// be decoded far enough to know it.
    pub fn error(action: Option<Action>, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            action,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// The carried message, if any.
    pub fn message_data(&self) -> Option<&MessageDto> {
        match &self.data {
            Some(EnvelopeData::Message(message)) => Some(message),
            _ => None,
        }
    }
}
