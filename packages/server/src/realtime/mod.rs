//! Real-time chat rooms.
//!
//! - `room`: one actor per ticket owning membership and broadcast
//! - `registry`: process-wide ticket id → live room directory
//! - `session`: one per connection, read and write tasks bridging a connection to its room
//! - `connection`: the transport seam sessions read from and write to

pub mod connection;
pub mod registry;
pub mod room;
pub mod session;

pub use connection::{ConnectionError, ConnectionReader, ConnectionWriter};
pub use registry::RoomRegistry;
pub use room::{DeliveryError, OnTerminate, Participant, RoomError, RoomHandle};
pub use session::{ChatActions, Session, SessionHandle};
