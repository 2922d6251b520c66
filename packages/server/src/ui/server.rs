//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::usecase::{AcceptConnectionUseCase, GetMessagesUseCase};

use super::{
    handler::{get_messages, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Ticket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(accept_connection_usecase, get_messages_usecase);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// AcceptConnectionUseCase（接続受け付けのユースケース）
    accept_connection_usecase: Arc<AcceptConnectionUseCase>,
    /// GetMessagesUseCase（メッセージ履歴取得のユースケース）
    get_messages_usecase: Arc<GetMessagesUseCase>,
}

impl Server {
    pub fn new(
        accept_connection_usecase: Arc<AcceptConnectionUseCase>,
        get_messages_usecase: Arc<GetMessagesUseCase>,
    ) -> Self {
        Self {
            accept_connection_usecase,
            get_messages_usecase,
        }
    }

    /// Build the router without binding. Used by `run` and by in-process tests.
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            accept_connection_usecase: self.accept_connection_usecase,
            get_messages_usecase: self.get_messages_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/api/tickets/{ticket_id}/chat", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/tickets/{ticket_id}/messages", get(get_messages))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the chat server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Ticket chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/api/tickets/{{ticket_id}}/chat", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
