//! Shared application state.

use std::sync::Arc;

use crate::usecase::{AcceptConnectionUseCase, GetMessagesUseCase};

/// Shared application state
pub struct AppState {
    /// AcceptConnectionUseCase（接続受け付けのユースケース、RoomRegistry を保持）
    pub accept_connection_usecase: Arc<AcceptConnectionUseCase>,
    /// GetMessagesUseCase（メッセージ履歴取得のユースケース）
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
}
