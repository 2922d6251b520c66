//! Connection seam between sessions and the transport.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("connection closed")]
    Closed,
    #[error("transport error: {0}")]
    Transport(String),
}

/// Inbound half of a client connection.
#[async_trait]
pub trait ConnectionReader: Send + 'static {
    /// Next text frame. `Ok(None)` means the peer closed the connection.
    ///
    /// Must be cancel safe: a session abandons a pending `recv` when it disconnects.
    async fn recv(&mut self) -> Result<Option<String>, ConnectionError>;
}

/// Outbound half of a client connection.
#[async_trait]
pub trait ConnectionWriter: Send + 'static {
    async fn send(&mut self, frame: String) -> Result<(), ConnectionError>;

    /// Close the connection. Called once, when the session's write task ends.
    async fn close(&mut self);
}
