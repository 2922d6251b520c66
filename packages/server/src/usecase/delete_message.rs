//! UseCase: チャットメッセージ削除

use std::sync::Arc;

use crate::domain::{
    CallerToken, IdentityProvider, MessageId, MessageRepository, TicketId,
    identity::resolve_caller,
};

use super::{error::ActionError, room_message::find_room_message};

/// メッセージ削除のユースケース
pub struct DeleteMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl DeleteMessageUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// メッセージ削除を実行し、削除したメッセージの ID を返す
    pub async fn execute(
        &self,
        ticket_id: TicketId,
        token: &CallerToken,
        id: MessageId,
    ) -> Result<MessageId, ActionError> {
        let message = find_room_message(self.repository.as_ref(), ticket_id, &id).await?;

        let caller = resolve_caller(self.identity.as_ref(), token).await?;
        if !message.can_be_modified_by(&caller) {
            tracing::warn!(
                "Account {} is not allowed to delete message '{}'",
                caller.account_id,
                id
            );
            return Err(ActionError::Forbidden);
        }

        self.repository.delete_message(&id).await?;
        Ok(message.id())
    }
}
