//! Channel-backed connection.
//!
//! `memory_connection()` returns the server-side halves handed to a session plus a
//! `MemoryPeer` playing the client. Used by tests and by embedders that bridge their
//! own transport.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    infrastructure::dto::websocket::Envelope,
    realtime::connection::{ConnectionError, ConnectionReader, ConnectionWriter},
};

/// Create a connected reader/writer/peer triple.
pub fn memory_connection() -> (MemoryReader, MemoryWriter, MemoryPeer) {
    let (to_server, inbound) = mpsc::unbounded_channel();
    let (outbound, from_server) = mpsc::unbounded_channel();
    (
        MemoryReader { inbound },
        MemoryWriter {
            outbound: Some(outbound),
        },
        MemoryPeer {
            to_server: Some(to_server),
            from_server,
        },
    )
}

pub struct MemoryReader {
    inbound: mpsc::UnboundedReceiver<Result<String, ConnectionError>>,
}

#[async_trait]
impl ConnectionReader for MemoryReader {
    async fn recv(&mut self) -> Result<Option<String>, ConnectionError> {
        match self.inbound.recv().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

pub struct MemoryWriter {
    outbound: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl ConnectionWriter for MemoryWriter {
    async fn send(&mut self, frame: String) -> Result<(), ConnectionError> {
        let outbound = self.outbound.as_ref().ok_or(ConnectionError::Closed)?;
        outbound.send(frame).map_err(|_| ConnectionError::Closed)
    }

    async fn close(&mut self) {
        self.outbound = None;
    }
}

/// Client end of a memory connection.
pub struct MemoryPeer {
    to_server: Option<mpsc::UnboundedSender<Result<String, ConnectionError>>>,
    from_server: mpsc::UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// Send a raw text frame to the server.
    pub fn send_text(&self, frame: impl Into<String>) -> Result<(), ConnectionError> {
        let to_server = self.to_server.as_ref().ok_or(ConnectionError::Closed)?;
        to_server
            .send(Ok(frame.into()))
            .map_err(|_| ConnectionError::Closed)
    }

    /// Send a JSON value as a text frame.
    pub fn send_json(&self, value: &serde_json::Value) -> Result<(), ConnectionError> {
        self.send_text(value.to_string())
    }

    /// Make the server's next read fail with a transport error.
    pub fn inject_error(&self, reason: impl Into<String>) -> Result<(), ConnectionError> {
        let to_server = self.to_server.as_ref().ok_or(ConnectionError::Closed)?;
        to_server
            .send(Err(ConnectionError::Transport(reason.into())))
            .map_err(|_| ConnectionError::Closed)
    }

    /// Close the client side; the server's reader sees end-of-stream.
    pub fn hang_up(&mut self) {
        self.to_server = None;
    }

    /// Next frame from the server, `None` once the server closed the connection.
    pub async fn recv_text(&mut self) -> Option<String> {
        self.from_server.recv().await
    }

    /// Next frame decoded as an envelope, waiting at most `timeout`.
    ///
    /// Returns `None` on timeout, on close, or if the frame is not an envelope.
    pub async fn recv_envelope(&mut self, timeout: Duration) -> Option<Envelope> {
        let frame = tokio::time::timeout(timeout, self.recv_text()).await.ok()??;
        serde_json::from_str(&frame).ok()
    }

    /// Wait until the server closes the connection, discarding frames.
    ///
    /// Returns `false` if the connection is still open after `timeout`.
    pub async fn wait_closed(&mut self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while self.recv_text().await.is_some() {}
        })
        .await
        .is_ok()
    }

    /// Whether a frame arrives within `timeout`.
    pub async fn has_pending(&mut self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.recv_text()).await,
            Ok(Some(_))
        )
    }
}
