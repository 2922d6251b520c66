//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parley_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    AccountId, ChatMessage, MessageContent, MessageId, MessageRepository, RepositoryError,
    TicketId,
};

/// インメモリ Message Repository 実装
///
/// ID とタイムスタンプは Repository が採番します。時刻は注入された `Clock` から取得します。
pub struct InMemoryMessageRepository {
    /// メッセージストア（Key: MessageId）
    messages: Mutex<HashMap<MessageId, ChatMessage>>,
    /// 時刻の取得元
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// 保存されているメッセージ数を取得
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_message(
        &self,
        ticket_id: TicketId,
        author_id: AccountId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = ChatMessage::new(
            MessageId::generate(),
            ticket_id,
            author_id,
            content,
            self.clock.now(),
        );

        let mut messages = self.messages.lock().await;
        messages.insert(message.id(), message.clone());
        tracing::debug!("Message '{}' stored for ticket {}", message.id(), ticket_id);

        Ok(message)
    }

    async fn get_message(&self, id: &MessageId) -> Result<ChatMessage, RepositoryError> {
        let messages = self.messages.lock().await;
        messages
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn update_message(
        &self,
        id: &MessageId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        message.revise(content, self.clock.now());
        Ok(message.clone())
    }

    async fn delete_message(&self, id: &MessageId) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        messages
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list_messages(&self, ticket_id: TicketId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        let mut found: Vec<ChatMessage> = messages
            .values()
            .filter(|m| m.ticket_id() == ticket_id)
            .cloned()
            .collect();
        // 新しい順
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(found)
    }
}
