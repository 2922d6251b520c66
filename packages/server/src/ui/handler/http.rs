//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    domain::TicketId,
    infrastructure::dto::{
        http::{MessageHistoryDto, RoomSummaryDto},
        websocket::MessageDto,
    },
    ui::state::AppState,
    usecase::GetMessagesError,
};

use super::{TokenQuery, caller_token, error_response};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.accept_connection_usecase.registry().live_rooms().await;

    let summaries = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            ticket_id: room.key().value(),
            instance_id: room.instance().to_string(),
            members: room.member_count(),
        })
        .collect();

    Json(summaries)
}

/// Get the message history of a ticket, newest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<i64>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Response {
    let ticket_id = match TicketId::new(ticket_id) {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let Some(token) = caller_token(&headers, &query) else {
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized");
    };

    match state.get_messages_usecase.execute(ticket_id, &token).await {
        Ok(messages) => {
            // Domain Model から DTO への変換
            let history = MessageHistoryDto {
                ticket_id: ticket_id.value(),
                messages: messages.iter().map(MessageDto::from).collect(),
            };
            Json(history).into_response()
        }
        Err(e @ GetMessagesError::Unauthenticated) => {
            error_response(StatusCode::UNAUTHORIZED, e.to_string())
        }
        Err(e @ GetMessagesError::Persistence(_)) => {
            tracing::error!("Failed to load messages of ticket {}: {}", ticket_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
