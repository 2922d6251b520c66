//! In-memory repository implementations.

mod message;

pub use message::InMemoryMessageRepository;
