//! Domain layer: value objects, entities, ports and their errors.
//!
//! Ports (`MessageRepository`, `IdentityProvider`) are defined here and implemented by
//! the infrastructure layer.

pub mod entity;
pub mod error;
pub mod identity;
pub mod repository;
pub mod value_object;

pub use entity::ChatMessage;
pub use error::{IdentityError, RepositoryError, ValueObjectError};
pub use identity::IdentityProvider;
pub use repository::MessageRepository;
pub use value_object::{
    AccountId, Caller, CallerToken, MessageContent, MessageId, Role, RoomInstanceId, SessionId,
    TicketId,
};
