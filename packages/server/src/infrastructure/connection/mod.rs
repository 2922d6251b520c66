//! Transport connection adapters.
//!
//! The chat core only sees the `ConnectionReader` / `ConnectionWriter` halves defined in
//! `crate::realtime::connection`; these modules provide them for real WebSockets and for
//! in-process channels.

pub mod memory;
pub mod websocket;

pub use memory::{MemoryPeer, MemoryReader, MemoryWriter, memory_connection};
pub use websocket::{WebSocketReader, WebSocketWriter, split_websocket};
