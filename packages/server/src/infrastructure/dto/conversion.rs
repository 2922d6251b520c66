//! Conversion logic between DTOs and domain entities.

use parley_shared::time::to_rfc3339_millis;

use crate::domain::ChatMessage;
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for dto::MessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id().to_string(),
            ticket_id: model.ticket_id().value(),
            author_id: model.author_id().value(),
            content: model.content().as_str().to_string(),
            created_at: to_rfc3339_millis(model.created_at()),
            updated_at: to_rfc3339_millis(model.updated_at()),
        }
    }
}

impl From<ChatMessage> for dto::MessageDto {
    fn from(model: ChatMessage) -> Self {
        Self::from(&model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, MessageContent, MessageId, TicketId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_domain_chat_message_to_dto() {
        // テスト項目: ドメインエンティティの ChatMessage が DTO に変換される
        // given (前提条件):
        let id = MessageId::generate();
        let mut message = ChatMessage::new(
            id,
            TicketId::new(3).unwrap(),
            AccountId::new(9),
            MessageContent::new("Hi!".to_string()).unwrap(),
            Utc.timestamp_millis_opt(1_672_531_200_000).unwrap(),
        );
        message.revise(
            MessageContent::new("Bye!".to_string()).unwrap(),
            Utc.timestamp_millis_opt(1_672_531_201_500).unwrap(),
        );

        // when (操作):
        let dto_msg: dto::MessageDto = message.into();

        // then (期待する結果):
        assert_eq!(dto_msg.id, id.to_string());
        assert_eq!(dto_msg.ticket_id, 3);
        assert_eq!(dto_msg.author_id, 9);
        assert_eq!(dto_msg.content, "Bye!");
        assert_eq!(dto_msg.created_at, "2023-01-01T00:00:00.000Z");
        assert_eq!(dto_msg.updated_at, "2023-01-01T00:00:01.500Z");
    }
}
