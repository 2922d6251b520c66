//! Domain entities.

use chrono::{DateTime, Utc};

use super::value_object::{AccountId, Caller, MessageContent, MessageId, TicketId};

/// A persisted chat message attached to a ticket.
///
/// The author is fixed at construction; `revise` is the only mutator and touches
/// nothing but the content and the update timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: MessageId,
    ticket_id: TicketId,
    author_id: AccountId,
    content: MessageContent,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message that has never been revised.
    pub fn new(
        id: MessageId,
        ticket_id: TicketId,
        author_id: AccountId,
        content: MessageContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            ticket_id,
            author_id,
            content,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    pub fn author_id(&self) -> AccountId {
        self.author_id
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the content and stamp the update time.
    pub fn revise(&mut self, content: MessageContent, at: DateTime<Utc>) {
        self.content = content;
        self.updated_at = at;
    }

    /// Only the author or a privileged role may update or delete a message.
    pub fn can_be_modified_by(&self, caller: &Caller) -> bool {
        caller.account_id == self.author_id || caller.role.is_privileged()
    }
}
