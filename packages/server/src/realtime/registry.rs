//! Process-wide directory of live rooms, keyed by ticket id.

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use futures_util::FutureExt;
use tokio::sync::Mutex;

use crate::domain::{RoomInstanceId, TicketId};

use super::room::{OnTerminate, RoomHandle};

/// Ticket id → live room.
///
/// At most one live room exists per ticket. A stopped room removes its own entry, and
/// only if the entry still points at that same instance.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<TicketId, RoomHandle>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the live room for `key`, spawning one if there is none.
    ///
    /// Concurrent callers for the same key all get the same instance. The returned room
    /// may still stop before the caller registers with it; callers retry in that case.
    pub async fn resolve(&self, key: TicketId) -> RoomHandle {
        let mut rooms = self.rooms.lock().await;
        if let Some(room) = rooms.get(&key) {
            if !room.is_stopped() {
                return room.clone();
            }
            tracing::debug!(
                "Replacing stopped room {} for ticket {}",
                room.instance(),
                key
            );
        }

        let room = RoomHandle::spawn(key, Some(self.forget_on_terminate(key)));
        rooms.insert(key, room.clone());
        tracing::debug!("Registered room {} for ticket {}", room.instance(), key);
        room
    }

    /// Live room for `key`, if any. Never spawns.
    pub async fn get(&self, key: TicketId) -> Option<RoomHandle> {
        let rooms = self.rooms.lock().await;
        rooms.get(&key).filter(|room| !room.is_stopped()).cloned()
    }

    /// Snapshot of live rooms ordered by ticket id.
    pub async fn live_rooms(&self) -> Vec<RoomHandle> {
        let rooms = self.rooms.lock().await;
        let mut live: Vec<RoomHandle> = rooms
            .values()
            .filter(|room| !room.is_stopped())
            .cloned()
            .collect();
        live.sort_by_key(|room| room.key());
        live
    }

    /// Number of registered entries, stopped rooms not yet forgotten included.
    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }

    fn forget_on_terminate(&self, key: TicketId) -> OnTerminate {
        let rooms: Weak<Mutex<HashMap<TicketId, RoomHandle>>> = Arc::downgrade(&self.rooms);
        Box::new(move |instance: RoomInstanceId| {
            async move {
                let Some(rooms) = rooms.upgrade() else {
                    return;
                };
                let mut rooms = rooms.lock().await;
                if rooms
                    .get(&key)
                    .is_some_and(|room| room.instance() == instance)
                {
                    rooms.remove(&key);
                    tracing::debug!("Forgot room {} for ticket {}", instance, key);
                }
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, time::Duration};

    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::SessionId,
        infrastructure::dto::websocket::Envelope,
        realtime::room::{DeliveryError, Participant},
    };

    struct Silent(SessionId);

    impl Participant for Silent {
        fn id(&self) -> SessionId {
            self.0
        }

        fn deliver(&self, _envelope: Envelope) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    fn ticket(id: i64) -> TicketId {
        TicketId::new(id).unwrap()
    }

    async fn wait_until_empty(registry: &RoomRegistry) -> bool {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !registry.is_empty().await {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .is_ok()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolve_returns_one_instance() {
        // テスト項目: 同じチケットへの同時 resolve は同一インスタンスを返す
        // given (前提条件):
        let registry = RoomRegistry::new();

        // when (操作):
        let (tx, mut rx) = mpsc::unbounded_channel();
        for _ in 0..16 {
            let registry = registry.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let room = registry.resolve(ticket(1)).await;
                let _ = tx.send(room.instance());
            });
        }
        drop(tx);
        let mut instances = HashSet::new();
        while let Some(instance) = rx.recv().await {
            instances.insert(instance);
        }

        // then (期待する結果):
        assert_eq!(instances.len(), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_tickets_get_distinct_rooms() {
        // テスト項目: チケットごとに別のルームが作られる
        // given (前提条件):
        let registry = RoomRegistry::new();

        // when (操作):
        let first = registry.resolve(ticket(1)).await;
        let second = registry.resolve(ticket(2)).await;

        // then (期待する結果):
        assert_ne!(first.instance(), second.instance());
        let keys: Vec<TicketId> = registry
            .live_rooms()
            .await
            .iter()
            .map(|room| room.key())
            .collect();
        assert_eq!(keys, vec![ticket(1), ticket(2)]);
    }

    #[tokio::test]
    async fn test_stopped_room_is_forgotten_and_replaced() {
        // テスト項目: 停止したルームはエントリから消え、次の resolve で新しいインスタンスが作られる
        // given (前提条件):
        let registry = RoomRegistry::new();
        let room = registry.resolve(ticket(7)).await;
        let member = SessionId::generate();
        room.register(Arc::new(Silent(member))).await.unwrap();

        // when (操作):
        room.unregister(member).unwrap();

        // then (期待する結果):
        assert!(wait_until_empty(&registry).await);
        assert!(room.is_stopped());
        assert!(registry.get(ticket(7)).await.is_none());

        // when (操作):
        let fresh = registry.resolve(ticket(7)).await;

        // then (期待する結果):
        assert_ne!(fresh.instance(), room.instance());
        assert!(!fresh.is_stopped());
        assert!(fresh.register(Arc::new(Silent(SessionId::generate()))).await.is_ok());
    }

    #[tokio::test]
    async fn test_stale_termination_keeps_live_entry() {
        // テスト項目: 古いインスタンスの終了通知は現在のエントリを消さない
        // given (前提条件):
        let registry = RoomRegistry::new();
        let live = registry.resolve(ticket(3)).await;

        // when (操作):
        let forget = registry.forget_on_terminate(ticket(3));
        forget(RoomInstanceId::generate()).await;

        // then (期待する結果):
        let current = registry.get(ticket(3)).await.unwrap();
        assert_eq!(current.instance(), live.instance());
    }
}
