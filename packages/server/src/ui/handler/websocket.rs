//! WebSocket connection handler.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};

use crate::{
    domain::{CallerToken, TicketId},
    infrastructure::connection::split_websocket,
    ui::state::AppState,
};

use super::{TokenQuery, caller_token, error_response};

/// Authenticate the caller, then upgrade and hand the socket to the ticket's chat room.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<i64>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Response {
    let ticket_id = match TicketId::new(ticket_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejected chat connection: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let Some(token) = caller_token(&headers, &query) else {
        tracing::warn!("Rejected chat connection to ticket {}: no token", ticket_id);
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized");
    };

    let caller = match state.accept_connection_usecase.authenticate(&token).await {
        Ok(caller) => caller,
        Err(e) => {
            tracing::warn!("Rejected chat connection to ticket {}: {}", ticket_id, e);
            return error_response(StatusCode::UNAUTHORIZED, e.to_string());
        }
    };

    tracing::info!(
        "Account {} ({}) connecting to ticket {}",
        caller.account_id,
        caller.role.as_str(),
        ticket_id
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state, ticket_id, token))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    ticket_id: TicketId,
    token: CallerToken,
) {
    let (reader, writer) = split_websocket(socket);

    match state
        .accept_connection_usecase
        .execute(ticket_id, token, reader, writer)
        .await
    {
        Ok(session) => session.closed().await,
        Err(e) => {
            tracing::warn!("Failed to accept chat connection: {}", e);
        }
    }
}
