//! Room-scoped message lookup shared by the update and delete use cases.

use crate::domain::{ChatMessage, MessageId, MessageRepository, TicketId};

use super::error::ActionError;

/// Load a message that belongs to `ticket_id`.
///
/// A message of another ticket is reported as not found.
pub(super) async fn find_room_message(
    repository: &dyn MessageRepository,
    ticket_id: TicketId,
    id: &MessageId,
) -> Result<ChatMessage, ActionError> {
    let message = repository.get_message(id).await?;
    if message.ticket_id() != ticket_id {
        tracing::warn!(
            "Message '{}' belongs to ticket {}, not {}",
            id,
            message.ticket_id(),
            ticket_id
        );
        return Err(ActionError::NotFound(id.to_string()));
    }
    Ok(message)
}
