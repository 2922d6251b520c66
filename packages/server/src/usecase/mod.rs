//! UseCase 層
//!
//! チャットルーム内のアクション（作成・更新・削除）、履歴取得、接続受付のユースケースを提供します。

mod accept_connection;
mod create_message;
mod delete_message;
mod error;
mod get_messages;
mod room_message;
mod update_message;

pub use accept_connection::{AcceptConnectionUseCase, MAX_JOIN_ATTEMPTS};
pub use create_message::CreateMessageUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use error::{AcceptError, ActionError, GetMessagesError};
pub use get_messages::GetMessagesUseCase;
pub use update_message::UpdateMessageUseCase;
