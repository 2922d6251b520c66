//! UseCase: チャットメッセージ作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateMessageUseCase::execute() メソッド
//! - 呼び出し元の特定 → チケットに紐づくメッセージの永続化
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成者 ID が Identity Port から解決されて保存される
//! - 異常系：未認証、永続化失敗

use std::sync::Arc;

use crate::domain::{
    CallerToken, ChatMessage, IdentityProvider, MessageContent, MessageRepository, TicketId,
};

use super::error::ActionError;

/// メッセージ作成のユースケース
pub struct CreateMessageUseCase {
    /// Repository（永続化の抽象化）
    repository: Arc<dyn MessageRepository>,
    /// IdentityProvider（呼び出し元特定の抽象化）
    identity: Arc<dyn IdentityProvider>,
}

impl CreateMessageUseCase {
    /// 新しい CreateMessageUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// メッセージ作成を実行
    ///
    /// # Arguments
    ///
    /// * `ticket_id` - ルームの親チケット
    /// * `token` - 接続時に提示された資格情報
    /// * `content` - メッセージ内容
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 永続化されたメッセージ
    /// * `Err(ActionError)` - 未認証または永続化失敗
    pub async fn execute(
        &self,
        ticket_id: TicketId,
        token: &CallerToken,
        content: MessageContent,
    ) -> Result<ChatMessage, ActionError> {
        let author_id = self.identity.caller_account_id(token).await?;

        let message = self
            .repository
            .create_message(ticket_id, author_id, content)
            .await?;

        tracing::debug!(
            "Account {} created message '{}' on ticket {}",
            author_id,
            message.id(),
            ticket_id
        );
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AccountId, IdentityError, MessageId, RepositoryError, identity::MockIdentityProvider,
        repository::MockMessageRepository,
    };
    use chrono::Utc;

    fn token() -> CallerToken {
        CallerToken::new("alice-token").unwrap()
    }

    fn ticket() -> TicketId {
        TicketId::new(1).unwrap()
    }

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_message_success() {
        // テスト項目: 呼び出し元のアカウントを作成者としてメッセージが保存される
        // given (前提条件):
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_caller_account_id()
            .times(1)
            .returning(|_| Ok(AccountId::new(7)));
        let mut repository = MockMessageRepository::new();
        repository
            .expect_create_message()
            .times(1)
            .returning(|ticket_id, author_id, content| {
                Ok(ChatMessage::new(
                    MessageId::generate(),
                    ticket_id,
                    author_id,
                    content,
                    Utc::now(),
                ))
            });
        let usecase = CreateMessageUseCase::new(Arc::new(repository), Arc::new(identity));

        // when (操作):
        let result = usecase.execute(ticket(), &token(), content("hi")).await;

        // then (期待する結果):
        let message = result.unwrap();
        assert_eq!(message.author_id(), AccountId::new(7));
        assert_eq!(message.ticket_id(), ticket());
        assert_eq!(message.content().as_str(), "hi");
    }

    #[tokio::test]
    async fn test_create_message_unauthenticated() {
        // テスト項目: 呼び出し元が特定できない場合は保存されずに Unauthenticated になる
        // given (前提条件):
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_caller_account_id()
            .returning(|_| Err(IdentityError::Unauthenticated));
        let mut repository = MockMessageRepository::new();
        repository.expect_create_message().never();
        let usecase = CreateMessageUseCase::new(Arc::new(repository), Arc::new(identity));

        // when (操作):
        let result = usecase.execute(ticket(), &token(), content("hi")).await;

        // then (期待する結果):
        assert_eq!(result, Err(ActionError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_create_message_persistence_failure() {
        // テスト項目: 永続化に失敗した場合は Persistence エラーになる
        // given (前提条件):
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_caller_account_id()
            .returning(|_| Ok(AccountId::new(7)));
        let mut repository = MockMessageRepository::new();
        repository
            .expect_create_message()
            .returning(|_, _, _| Err(RepositoryError::Storage("connection reset".to_string())));
        let usecase = CreateMessageUseCase::new(Arc::new(repository), Arc::new(identity));

        // when (操作):
        let result = usecase.execute(ticket(), &token(), content("hi")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ActionError::Persistence("connection reset".to_string()))
        );
    }
}
