//! Room actor: one task per live ticket room.
//!
//! The actor owns the member set outright. Everything else talks to it through a
//! `RoomHandle`, whose calls all land on a single inlet:
//!
//! - register: add a participant, acknowledged once the member is in place
//! - unregister: remove a participant; removing the last one stops the room
//! - broadcast: fan an envelope out to every member
//!
//! Events are processed in arrival order, so a broadcast reaches exactly the members
//! present when it was submitted. After stop no further event is processed; queued
//! registrations are refused and queued broadcasts are dropped.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{RoomInstanceId, SessionId, TicketId},
    infrastructure::dto::websocket::Envelope,
};

/// Callback run exactly once when a room stops, with the stopped instance's id.
pub type OnTerminate = Box<dyn FnOnce(RoomInstanceId) -> BoxFuture<'static, ()> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("chat room is no longer available")]
    Unavailable,
}

/// Why an envelope could not be handed to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("participant outbox is full")]
    Full,
    #[error("participant outbox is closed")]
    Closed,
}

/// A room member: anything that can take envelopes without blocking the room.
pub trait Participant: Send + Sync {
    fn id(&self) -> SessionId;

    /// Hand an envelope over. Must not wait for the participant to drain.
    fn deliver(&self, envelope: Envelope) -> Result<(), DeliveryError>;
}

enum RoomEvent {
    Register {
        participant: Arc<dyn Participant>,
        ack: oneshot::Sender<()>,
    },
    Unregister(SessionId),
    Broadcast(Envelope),
}

/// State observable from handles without going through the actor.
#[derive(Default)]
struct RoomState {
    stopped: AtomicBool,
    members: AtomicUsize,
}

/// Cheap clonable address of a room actor.
#[derive(Clone)]
pub struct RoomHandle {
    key: TicketId,
    instance: RoomInstanceId,
    events: mpsc::UnboundedSender<RoomEvent>,
    state: Arc<RoomState>,
}

impl std::fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHandle")
            .field("key", &self.key)
            .field("instance", &self.instance)
            .field("stopped", &self.is_stopped())
            .field("members", &self.member_count())
            .finish()
    }
}

impl RoomHandle {
    /// Spawn a new room actor for `key` on the current tokio runtime.
    pub fn spawn(key: TicketId, on_terminate: Option<OnTerminate>) -> Self {
        let (events, inbox) = mpsc::unbounded_channel();
        let state = Arc::new(RoomState::default());
        let instance = RoomInstanceId::generate();

        let room = Room {
            key,
            instance,
            members: HashMap::new(),
            inbox,
            state: Arc::clone(&state),
            on_terminate,
        };
        tokio::spawn(room.run());

        Self {
            key,
            instance,
            events,
            state,
        }
    }

    pub fn key(&self) -> TicketId {
        self.key
    }

    pub fn instance(&self) -> RoomInstanceId {
        self.instance
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::Acquire)
    }

    /// Number of current members as last published by the actor.
    pub fn member_count(&self) -> usize {
        self.state.members.load(Ordering::Acquire)
    }

    /// Add a participant and wait until the room has taken it in.
    ///
    /// Fails with `RoomError::Unavailable` if the room stopped before the registration
    /// was processed; the participant is then not a member.
    pub async fn register(&self, participant: Arc<dyn Participant>) -> Result<(), RoomError> {
        if self.is_stopped() {
            return Err(RoomError::Unavailable);
        }
        let (ack, acked) = oneshot::channel();
        self.send(RoomEvent::Register { participant, ack })?;
        acked.await.map_err(|_| RoomError::Unavailable)
    }

    /// Ask the room to drop a participant. Unknown ids are ignored by the room.
    pub fn unregister(&self, id: SessionId) -> Result<(), RoomError> {
        self.send(RoomEvent::Unregister(id))
    }

    /// Queue an envelope for every current member.
    ///
    /// An `Err` means the room has stopped and the envelope was dropped. An envelope
    /// still queued when the room stops is dropped as well.
    pub fn broadcast(&self, envelope: Envelope) -> Result<(), RoomError> {
        if self.is_stopped() {
            return Err(RoomError::Unavailable);
        }
        self.send(RoomEvent::Broadcast(envelope))
    }

    fn send(&self, event: RoomEvent) -> Result<(), RoomError> {
        self.events.send(event).map_err(|_| RoomError::Unavailable)
    }
}

struct Room {
    key: TicketId,
    instance: RoomInstanceId,
    members: HashMap<SessionId, Arc<dyn Participant>>,
    inbox: mpsc::UnboundedReceiver<RoomEvent>,
    state: Arc<RoomState>,
    on_terminate: Option<OnTerminate>,
}

impl Room {
    async fn run(mut self) {
        tracing::info!(
            "Room for ticket {} started (instance {})",
            self.key,
            self.instance
        );

        // `None` once every handle is gone
        while let Some(event) = self.inbox.recv().await {
            let keep_running = match event {
                RoomEvent::Register { participant, ack } => {
                    self.handle_register(participant, ack)
                }
                RoomEvent::Unregister(id) => self.handle_unregister(id),
                RoomEvent::Broadcast(envelope) => {
                    self.handle_broadcast(envelope);
                    true
                }
            };
            if !keep_running {
                break;
            }
        }

        self.stop().await;
    }

    /// Returns `false` once the room must stop.
    fn handle_register(
        &mut self,
        participant: Arc<dyn Participant>,
        ack: oneshot::Sender<()>,
    ) -> bool {
        let id = participant.id();
        self.members.insert(id, participant);
        self.publish_member_count();

        if ack.send(()).is_err() {
            // registering side went away before the acknowledgement
            tracing::debug!("Registration of session {} was abandoned", id);
            self.members.remove(&id);
            self.publish_member_count();
            return !self.members.is_empty();
        }

        tracing::info!(
            "Session {} joined ticket {} ({} members)",
            id,
            self.key,
            self.members.len()
        );
        true
    }

    /// Returns `false` once the room must stop.
    fn handle_unregister(&mut self, id: SessionId) -> bool {
        if self.members.remove(&id).is_none() {
            return true;
        }
        self.publish_member_count();
        tracing::info!(
            "Session {} left ticket {} ({} members)",
            id,
            self.key,
            self.members.len()
        );
        !self.members.is_empty()
    }

    fn handle_broadcast(&self, envelope: Envelope) {
        for (id, member) in &self.members {
            match member.deliver(envelope.clone()) {
                Ok(()) => {}
                Err(DeliveryError::Full) => {
                    tracing::warn!("Outbox of session {} is full, skipping event", id);
                }
                Err(DeliveryError::Closed) => {
                    tracing::debug!("Outbox of session {} is closed, skipping event", id);
                }
            }
        }
    }

    fn publish_member_count(&self) {
        self.state
            .members
            .store(self.members.len(), Ordering::Release);
    }

    async fn stop(&mut self) {
        if self.state.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        self.inbox.close();

        // dropping the acks refuses the queued registrations
        let mut refused = 0;
        let mut dropped = 0;
        while let Ok(event) = self.inbox.try_recv() {
            match event {
                RoomEvent::Register { .. } => refused += 1,
                RoomEvent::Broadcast(_) => dropped += 1,
                RoomEvent::Unregister(_) => {}
            }
        }

        self.members.clear();
        self.publish_member_count();

        tracing::info!(
            "Room for ticket {} stopped (instance {}, {} registrations refused, {} events dropped)",
            self.key,
            self.instance,
            refused,
            dropped
        );

        if let Some(on_terminate) = self.on_terminate.take() {
            on_terminate(self.instance).await;
        }
    }
}
