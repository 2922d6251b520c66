//! UseCase: チャットメッセージ更新
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UpdateMessageUseCase::execute() メソッド
//! - 対象メッセージの取得 → 認可（作成者または admin）→ 更新
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成者による更新、admin による更新
//! - 異常系：権限のない呼び出し元（更新されない）、存在しないメッセージ、別チケットのメッセージ

use std::sync::Arc;

use crate::domain::{
    CallerToken, ChatMessage, IdentityProvider, MessageContent, MessageId, MessageRepository,
    TicketId, identity::resolve_caller,
};

use super::{error::ActionError, room_message::find_room_message};

/// メッセージ更新のユースケース
pub struct UpdateMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl UpdateMessageUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// メッセージ更新を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 更新後のメッセージ
    /// * `Err(ActionError::Forbidden)` - 作成者でも admin でもない（更新は行われない）
    /// * `Err(ActionError)` - その他の失敗
    pub async fn execute(
        &self,
        ticket_id: TicketId,
        token: &CallerToken,
        id: MessageId,
        content: MessageContent,
    ) -> Result<ChatMessage, ActionError> {
        // 1. 対象メッセージを取得
        let message = find_room_message(self.repository.as_ref(), ticket_id, &id).await?;

        // 2. 認可
        let caller = resolve_caller(self.identity.as_ref(), token).await?;
        if !message.can_be_modified_by(&caller) {
            tracing::warn!(
                "Account {} is not allowed to update message '{}'",
                caller.account_id,
                id
            );
            return Err(ActionError::Forbidden);
        }

        // 3. 更新
        let updated = self.repository.update_message(&id, content).await?;
        Ok(updated)
    }
}
