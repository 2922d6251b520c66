//! One session per accepted connection.
//!
//! A session runs two tasks:
//!
//! - read task: decodes action requests, runs them through the use cases, broadcasts the
//!   resulting event to the room or replies with an error to this connection only
//! - write task: drains the session outbox into the connection
//!
//! Either task ending, or any failure on the way, triggers `disconnect`, which runs its
//! teardown at most once.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use serde::de::DeserializeOwned;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    domain::{CallerToken, MessageContent, MessageId, SessionId, TicketId},
    infrastructure::dto::websocket::{
        Action, ActionRequest, CreatePayload, DeletePayload, Envelope, MessageDto, UpdatePayload,
    },
    usecase::{ActionError, CreateMessageUseCase, DeleteMessageUseCase, UpdateMessageUseCase},
};

use super::{
    connection::{ConnectionReader, ConnectionWriter},
    room::{DeliveryError, Participant, RoomHandle},
};

/// Upper bound on closing a connection whose peer stopped reading.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Use cases reachable from inside a room.
pub struct ChatActions {
    pub create: Arc<CreateMessageUseCase>,
    pub update: Arc<UpdateMessageUseCase>,
    pub delete: Arc<DeleteMessageUseCase>,
}

/// The room-facing side of a session: its id and the sending half of its outbox.
pub struct Mailbox {
    id: SessionId,
    outbox: mpsc::Sender<Envelope>,
}

impl Mailbox {
    pub fn new(id: SessionId, outbox: mpsc::Sender<Envelope>) -> Self {
        Self { id, outbox }
    }
}

impl Participant for Mailbox {
    fn id(&self) -> SessionId {
        self.id
    }

    fn deliver(&self, envelope: Envelope) -> Result<(), DeliveryError> {
        self.outbox.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

pub struct Session {
    id: SessionId,
    ticket_id: TicketId,
    /// Credentials captured at accept time, used for every action of this session
    token: CallerToken,
    room: RoomHandle,
    outbox: mpsc::Sender<Envelope>,
    closed: watch::Sender<bool>,
    disconnected: AtomicBool,
    actions: Arc<ChatActions>,
}

impl Session {
    /// Build a session for a participant already registered in `room` under `id`.
    pub fn new(
        id: SessionId,
        ticket_id: TicketId,
        token: CallerToken,
        room: RoomHandle,
        outbox: mpsc::Sender<Envelope>,
        actions: Arc<ChatActions>,
    ) -> Arc<Self> {
        let (closed, _) = watch::channel(false);
        Arc::new(Self {
            id,
            ticket_id,
            token,
            room,
            outbox,
            closed,
            disconnected: AtomicBool::new(false),
            actions,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    pub fn room(&self) -> &RoomHandle {
        &self.room
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Spawn the read and write tasks over `reader` and `writer`.
    pub fn start<R, W>(
        self: &Arc<Self>,
        outbox_rx: mpsc::Receiver<Envelope>,
        reader: R,
        writer: W,
    ) -> SessionHandle
    where
        R: ConnectionReader,
        W: ConnectionWriter,
    {
        let read_task = tokio::spawn(Arc::clone(self).read_loop(reader));
        let write_task = tokio::spawn(Arc::clone(self).write_loop(outbox_rx, writer));
        SessionHandle {
            session: Arc::clone(self),
            read_task,
            write_task,
        }
    }

    /// Leave the room and stop both tasks. The write task then closes the connection,
    /// even when it was blocked on a peer that stopped reading.
    ///
    /// Safe to call from anywhere, any number of times. Returns `true` only for the call
    /// that actually performed the teardown.
    pub fn disconnect(&self) -> bool {
        if self.disconnected.swap(true, Ordering::AcqRel) {
            return false;
        }
        if self.room.unregister(self.id).is_err() {
            tracing::debug!(
                "Room for ticket {} already stopped when session {} left",
                self.ticket_id,
                self.id
            );
        }
        self.closed.send_replace(true);
        tracing::info!(
            "Session {} disconnected from ticket {}",
            self.id,
            self.ticket_id
        );
        true
    }

    async fn read_loop<R: ConnectionReader>(self: Arc<Self>, mut reader: R) {
        let mut closed = self.closed.subscribe();
        loop {
            let frame = tokio::select! {
                _ = wait_closed(&mut closed) => break,
                frame = reader.recv() => frame,
            };
            match frame {
                Ok(Some(frame)) => {
                    if !self.handle_frame(&frame).await {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!("Session {} closed by peer", self.id);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Session {} read failed: {}", self.id, e);
                    break;
                }
            }
        }
        self.disconnect();
    }

    async fn write_loop<W: ConnectionWriter>(
        self: Arc<Self>,
        mut outbox_rx: mpsc::Receiver<Envelope>,
        mut writer: W,
    ) {
        let mut closed = self.closed.subscribe();
        loop {
            let envelope = tokio::select! {
                biased;
                _ = wait_closed(&mut closed) => break,
                envelope = outbox_rx.recv() => match envelope {
                    Some(envelope) => envelope,
                    None => break,
                },
            };
            let frame = match serde_json::to_string(&envelope) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to serialize event for session {}: {}", self.id, e);
                    continue;
                }
            };
            let sent = tokio::select! {
                biased;
                _ = wait_closed(&mut closed) => break,
                sent = writer.send(frame) => sent,
            };
            if let Err(e) = sent {
                tracing::warn!("Session {} write failed: {}", self.id, e);
                break;
            }
        }
        outbox_rx.close();
        if tokio::time::timeout(CLOSE_TIMEOUT, writer.close())
            .await
            .is_err()
        {
            tracing::debug!("Session {} connection did not close in time", self.id);
        }
        self.disconnect();
    }

    /// Handle one inbound frame. Returns `false` when the session must end.
    async fn handle_frame(&self, frame: &str) -> bool {
        let request: ActionRequest = match serde_json::from_str(frame) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("Session {} sent an undecodable frame: {}", self.id, e);
                let error = ActionError::Protocol(e.to_string());
                return self.reply(Envelope::error(None, error.to_string())).await;
            }
        };

        let action = request.action;
        match self.dispatch(request).await {
            Ok(event) => {
                if self.room.broadcast(event).is_err() {
                    tracing::warn!(
                        "Room for ticket {} is gone, ending session {}",
                        self.ticket_id,
                        self.id
                    );
                    return false;
                }
                true
            }
            Err(e) => {
                tracing::debug!("Session {} {:?} failed: {}", self.id, action, e);
                self.reply(Envelope::error(Some(action), e.to_string())).await
            }
        }
    }

    async fn dispatch(&self, request: ActionRequest) -> Result<Envelope, ActionError> {
        match request.action {
            Action::Create => {
                let payload: CreatePayload = decode_payload(request.payload)?;
                let content = MessageContent::new(payload.content)?;
                let message = self
                    .actions
                    .create
                    .execute(self.ticket_id, &self.token, content)
                    .await?;
                Ok(Envelope::created(MessageDto::from(message)))
            }
            Action::Update => {
                let payload: UpdatePayload = decode_payload(request.payload)?;
                let id = MessageId::parse(&payload.id)?;
                let content = MessageContent::new(payload.content)?;
                let message = self
                    .actions
                    .update
                    .execute(self.ticket_id, &self.token, id, content)
                    .await?;
                Ok(Envelope::updated(MessageDto::from(message)))
            }
            Action::Delete => {
                let payload: DeletePayload = decode_payload(request.payload)?;
                let id = MessageId::parse(&payload.id)?;
                let id = self
                    .actions
                    .delete
                    .execute(self.ticket_id, &self.token, id)
                    .await?;
                Ok(Envelope::deleted(id.to_string()))
            }
        }
    }

    /// Queue an envelope for this connection only. Returns `false` once the write side
    /// is gone.
    async fn reply(&self, envelope: Envelope) -> bool {
        self.outbox.send(envelope).await.is_ok()
    }
}

/// Running session: the session plus its two tasks.
pub struct SessionHandle {
    session: Arc<Session>,
    read_task: JoinHandle<()>,
    write_task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn room(&self) -> &RoomHandle {
        self.session.room()
    }

    pub fn disconnect(&self) -> bool {
        self.session.disconnect()
    }

    /// Wait for both tasks to finish.
    pub async fn closed(self) {
        for task in [self.read_task, self.write_task] {
            if let Err(e) = task.await {
                tracing::error!("Session {} task failed: {}", self.session.id(), e);
            }
        }
    }
}

fn decode_payload<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, ActionError> {
    serde_json::from_value(payload).map_err(|e| ActionError::Protocol(e.to_string()))
}

async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed {
            return;
        }
        if closed.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::{AccountId, IdentityProvider, MessageRepository, Role},
        infrastructure::{
            connection::memory_connection,
            identity::{AccountSeed, InMemoryIdentityProvider},
            repository::InMemoryMessageRepository,
        },
        realtime::{connection::ConnectionError, registry::RoomRegistry},
    };
    use parley_shared::time::SystemClock;

    /// Writer whose peer never reads: every send stays pending.
    struct StalledWriter {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ConnectionWriter for StalledWriter {
        async fn send(&mut self, _frame: String) -> Result<(), ConnectionError> {
            std::future::pending::<()>().await;
            Ok(())
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::Release);
        }
    }

    fn actions() -> Arc<ChatActions> {
        let repository: Arc<dyn MessageRepository> =
            Arc::new(InMemoryMessageRepository::new(Arc::new(SystemClock)));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(InMemoryIdentityProvider::new([AccountSeed {
                token: "alice-token".to_string(),
                account_id: 1,
                role: Role::User,
            }]));
        Arc::new(ChatActions {
            create: Arc::new(CreateMessageUseCase::new(
                repository.clone(),
                identity.clone(),
            )),
            update: Arc::new(UpdateMessageUseCase::new(
                repository.clone(),
                identity.clone(),
            )),
            delete: Arc::new(DeleteMessageUseCase::new(repository, identity)),
        })
    }

    async fn joined_session(
        registry: &RoomRegistry,
    ) -> (Arc<Session>, mpsc::Receiver<Envelope>) {
        let ticket_id = TicketId::new(1).unwrap();
        let room = registry.resolve(ticket_id).await;
        let id = SessionId::generate();
        let (outbox, outbox_rx) = mpsc::channel(8);
        room.register(Arc::new(Mailbox::new(id, outbox.clone())))
            .await
            .unwrap();
        let session = Session::new(
            id,
            ticket_id,
            CallerToken::new("alice-token").unwrap(),
            room,
            outbox,
            actions(),
        );
        (session, outbox_rx)
    }

    #[tokio::test]
    async fn test_mailbox_reports_full_and_closed() {
        // テスト項目: Mailbox は満杯・クローズ済みの outbox をそれぞれ区別して報告する
        // given (前提条件):
        let (outbox, outbox_rx) = mpsc::channel(1);
        let mailbox = Mailbox::new(SessionId::generate(), outbox);

        // when (操作):
        let first = mailbox.deliver(Envelope::deleted("a".to_string()));
        let second = mailbox.deliver(Envelope::deleted("b".to_string()));
        drop(outbox_rx);
        let third = mailbox.deliver(Envelope::deleted("c".to_string()));

        // then (期待する結果):
        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(DeliveryError::Full));
        assert_eq!(third, Err(DeliveryError::Closed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_disconnect_tears_down_once() {
        // テスト項目: 同時に disconnect が呼ばれてもティアダウンは 1 回だけ実行される
        // given (前提条件):
        let registry = RoomRegistry::new();
        let (session, _outbox_rx) = joined_session(&registry).await;
        let room = session.room().clone();

        // when (操作):
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let session = Arc::clone(&session);
            tasks.push(tokio::spawn(async move { session.disconnect() }));
        }
        let mut performed = 0;
        for task in tasks {
            if task.await.unwrap() {
                performed += 1;
            }
        }

        // then (期待する結果):
        assert_eq!(performed, 1);
        assert!(session.is_disconnected());
        assert!(!session.disconnect());
        tokio::time::timeout(Duration::from_secs(2), async {
            while !room.is_stopped() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_stops_both_tasks_and_closes_connection() {
        // テスト項目: disconnect で読み書き両タスクが終了し、接続が閉じられる
        // given (前提条件):
        let registry = RoomRegistry::new();
        let (session, outbox_rx) = joined_session(&registry).await;
        let (reader, writer, mut peer) = memory_connection();
        let handle = session.start(outbox_rx, reader, writer);

        // when (操作):
        assert!(handle.disconnect());

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(2), handle.closed())
            .await
            .unwrap();
        assert!(peer.wait_closed(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_created_event_is_broadcast_to_the_sender_too() {
        // テスト項目: create の結果は送信者自身を含むルーム全体に配信される
        // given (前提条件):
        let registry = RoomRegistry::new();
        let (session, outbox_rx) = joined_session(&registry).await;
        let (reader, writer, mut peer) = memory_connection();
        let handle = session.start(outbox_rx, reader, writer);

        // when (操作):
        peer.send_json(&serde_json::json!({"action": "create", "payload": {"content": "hi"}}))
            .unwrap();

        // then (期待する結果):
        let envelope = peer.recv_envelope(Duration::from_secs(2)).await.unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.action, Some(Action::Create));
        let message = envelope.message_data().unwrap();
        assert_eq!(message.content, "hi");
        assert_eq!(message.author_id, AccountId::new(1).value());

        handle.disconnect();
    }

    #[tokio::test]
    async fn test_disconnect_ends_write_task_blocked_on_stalled_connection() {
        // テスト項目: 書き込みが詰まったままでも disconnect で両タスクが終了し、接続が閉じられる
        // given (前提条件):
        let registry = RoomRegistry::new();
        let (session, outbox_rx) = joined_session(&registry).await;
        let room = session.room().clone();
        let (reader, _writer, _peer) = memory_connection();
        let writer_closed = Arc::new(AtomicBool::new(false));
        let writer = StalledWriter {
            closed: Arc::clone(&writer_closed),
        };
        let handle = session.start(outbox_rx, reader, writer);
        room.broadcast(Envelope::deleted("m-1".to_string())).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // when (操作):
        assert!(handle.disconnect());

        // then (期待する結果):
        tokio::time::timeout(Duration::from_secs(2), handle.closed())
            .await
            .unwrap();
        assert!(writer_closed.load(Ordering::Acquire));
    }
}
