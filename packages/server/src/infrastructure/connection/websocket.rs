//! axum `WebSocket` を使った Connection 実装

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};

use crate::realtime::connection::{ConnectionError, ConnectionReader, ConnectionWriter};

/// Split an upgraded socket into the reader/writer halves used by a session.
pub fn split_websocket(socket: WebSocket) -> (WebSocketReader, WebSocketWriter) {
    let (sink, stream) = socket.split();
    (WebSocketReader { stream }, WebSocketWriter { sink })
}

/// Inbound half of a WebSocket.
pub struct WebSocketReader {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl ConnectionReader for WebSocketReader {
    async fn recv(&mut self) -> Result<Option<String>, ConnectionError> {
        while let Some(msg) = self.stream.next().await {
            let msg = msg.map_err(|e| ConnectionError::Transport(e.to_string()))?;
            match msg {
                Message::Text(text) => return Ok(Some(text.to_string())),
                Message::Binary(bytes) => {
                    return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::trace!("Skipping control frame");
                }
                Message::Close(_) => return Ok(None),
            }
        }
        Ok(None)
    }
}

/// Outbound half of a WebSocket.
pub struct WebSocketWriter {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl ConnectionWriter for WebSocketWriter {
    async fn send(&mut self, frame: String) -> Result<(), ConnectionError> {
        self.sink
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| ConnectionError::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.close().await {
            tracing::debug!("WebSocket close failed: {}", e);
        }
    }
}
