//! UseCase: 接続の受け付け
//!
//! 受け付け済みのコネクションをチケットのルームに参加させ、セッションを開始します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AcceptConnectionUseCase::authenticate() / execute() メソッド
//! - ルームの解決 → メンバー登録 → 読み書きタスクの起動
//!
//! ### どのような状況を想定しているか
//! - 正常系：同じチケットへの接続が同じルームに入る
//! - 異常系：未認証のトークン
//! - 境界値：停止済みルームへの再接続で新しいルームが作られる

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{Caller, CallerToken, IdentityProvider, SessionId, TicketId, identity::resolve_caller},
    realtime::{
        ChatActions, ConnectionReader, ConnectionWriter, RoomRegistry, Session, SessionHandle,
        session::Mailbox,
    },
};

use super::error::AcceptError;

/// How many times a join re-resolves the room after finding it stopped.
pub const MAX_JOIN_ATTEMPTS: usize = 3;

/// 接続受け付けのユースケース
pub struct AcceptConnectionUseCase {
    /// RoomRegistry（チケット ID → ライブルーム）
    registry: RoomRegistry,
    /// IdentityProvider（呼び出し元特定の抽象化）
    identity: Arc<dyn IdentityProvider>,
    /// ルーム内アクションのユースケース群
    actions: Arc<ChatActions>,
    /// セッションごとの送信キューの容量
    outbox_capacity: usize,
}

impl AcceptConnectionUseCase {
    pub fn new(
        registry: RoomRegistry,
        identity: Arc<dyn IdentityProvider>,
        actions: Arc<ChatActions>,
        outbox_capacity: usize,
    ) -> Self {
        Self {
            registry,
            identity,
            actions,
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// トークンから呼び出し元を特定する（アップグレード前の認証に使用）
    pub async fn authenticate(&self, token: &CallerToken) -> Result<Caller, AcceptError> {
        resolve_caller(self.identity.as_ref(), token)
            .await
            .map_err(|_| AcceptError::Unauthenticated)
    }

    /// 接続受け付けを実行
    ///
    /// # Arguments
    ///
    /// * `ticket_id` - 参加するルームのチケット
    /// * `token` - 接続時に提示された資格情報（セッション中のすべてのアクションで使用）
    /// * `reader` / `writer` - 受け付け済みコネクションの読み書き側
    ///
    /// # Returns
    ///
    /// * `Ok(SessionHandle)` - ルームに登録済みで、読み書きタスクが起動したセッション
    /// * `Err(AcceptError::RoomUnavailable)` - 再解決を繰り返してもルームが停止していた
    pub async fn execute<R, W>(
        &self,
        ticket_id: TicketId,
        token: CallerToken,
        reader: R,
        writer: W,
    ) -> Result<SessionHandle, AcceptError>
    where
        R: ConnectionReader,
        W: ConnectionWriter,
    {
        let session_id = SessionId::generate();
        let (outbox, outbox_rx) = mpsc::channel(self.outbox_capacity);

        let mut joined = None;
        for attempt in 1..=MAX_JOIN_ATTEMPTS {
            let room = self.registry.resolve(ticket_id).await;
            let mailbox = Arc::new(Mailbox::new(session_id, outbox.clone()));
            match room.register(mailbox).await {
                Ok(()) => {
                    joined = Some(room);
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        "Join attempt {} for ticket {} failed: {}",
                        attempt,
                        ticket_id,
                        e
                    );
                }
            }
        }
        let Some(room) = joined else {
            tracing::warn!(
                "Session {} could not join ticket {} after {} attempts",
                session_id,
                ticket_id,
                MAX_JOIN_ATTEMPTS
            );
            return Err(AcceptError::RoomUnavailable(ticket_id));
        };

        let session = Session::new(
            session_id,
            ticket_id,
            token,
            room,
            outbox,
            Arc::clone(&self.actions),
        );
        tracing::info!(
            "Session {} accepted into ticket {} (room {})",
            session_id,
            ticket_id,
            session.room().instance()
        );
        Ok(session.start(outbox_rx, reader, writer))
    }
}
