//! Repository trait 定義
//!
//! ドメイン層が必要とするチャットメッセージ永続化のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ChatMessage, RepositoryError,
    value_object::{AccountId, MessageContent, MessageId, TicketId},
};

/// Chat message persistence port.
///
/// The repository owns identity and timestamps: `create_message` assigns the id and
/// creation time, `update_message` stamps the update time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを作成して永続化
    async fn create_message(
        &self,
        ticket_id: TicketId,
        author_id: AccountId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError>;

    /// ID でメッセージを取得（存在しない場合は `RepositoryError::NotFound`）
    async fn get_message(&self, id: &MessageId) -> Result<ChatMessage, RepositoryError>;

    /// メッセージ内容を更新
    async fn update_message(
        &self,
        id: &MessageId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError>;

    /// メッセージを削除
    async fn delete_message(&self, id: &MessageId) -> Result<(), RepositoryError>;

    /// チケットに属するメッセージを新しい順に取得
    async fn list_messages(&self, ticket_id: TicketId) -> Result<Vec<ChatMessage>, RepositoryError>;
}
