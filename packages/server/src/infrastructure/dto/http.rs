//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::MessageDto;

/// A live chat room as reported by `GET /api/rooms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub ticket_id: i64,
    pub instance_id: String,
    pub members: usize,
}

/// Message history of a ticket as reported by `GET /api/tickets/{ticket_id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHistoryDto {
    pub ticket_id: i64,
    pub messages: Vec<MessageDto>,
}

/// Error body returned by HTTP endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub message: String,
}
