//! UseCase: チケットのメッセージ履歴取得
//!
//! ライブルームとは独立したリクエスト/レスポンス型のクエリです。

use std::sync::Arc;

use crate::domain::{CallerToken, ChatMessage, IdentityProvider, MessageRepository, TicketId};

use super::error::GetMessagesError;

/// メッセージ履歴取得のユースケース
pub struct GetMessagesUseCase {
    repository: Arc<dyn MessageRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl GetMessagesUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// 認証済みの呼び出し元に対してチケットのメッセージを新しい順に返す
    pub async fn execute(
        &self,
        ticket_id: TicketId,
        token: &CallerToken,
    ) -> Result<Vec<ChatMessage>, GetMessagesError> {
        self.identity.caller_account_id(token).await?;
        let messages = self.repository.list_messages(ticket_id).await?;
        Ok(messages)
    }
}
