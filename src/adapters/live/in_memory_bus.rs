//! In-process event bus organized in per-session rooms.
//!
//! # Architecture
//!
//! ```text
//! Room: 4821           Room: 0937
//! ├── follower-a       ├── follower-d
//! ├── follower-b       └── follower-e
//! └── follower-c
//! ```
//!
//! Each room is a tokio broadcast channel. Every follower owns a bounded
//! slot in it; a follower that falls behind loses the oldest events
//! instead of slowing the publisher down. Empty rooms are removed when
//! their last follower cancels.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::live::{LiveEvent, SessionKey};
use crate::ports::{BusError, LiveEventBus, Subscription};

/// Default per-follower queue length.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 32;

type Rooms = HashMap<SessionKey, broadcast::Sender<LiveEvent>>;

/// Event bus for single-instance deployments and tests.
#[derive(Clone)]
pub struct InMemoryEventBus {
    rooms: Arc<Mutex<Rooms>>,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a bus whose followers each buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Keys that currently have a room (for monitoring/debugging).
    pub fn active_rooms(&self) -> Vec<SessionKey> {
        lock(&self.rooms).keys().cloned().collect()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

fn lock(rooms: &Mutex<Rooms>) -> MutexGuard<'_, Rooms> {
    rooms.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl LiveEventBus for InMemoryEventBus {
    async fn publish(&self, key: &SessionKey, event: &LiveEvent) -> Result<(), BusError> {
        // Sending under the lock keeps one total order per room.
        let rooms = lock(&self.rooms);
        if let Some(sender) = rooms.get(key) {
            // No receivers is fine: nobody is watching.
            let delivered = sender.send(event.clone()).unwrap_or(0);
            tracing::trace!(key = %key, event = event.name(), delivered, "Published live event");
        }
        Ok(())
    }

    async fn subscribe(&self, key: &SessionKey) -> Result<Subscription, BusError> {
        let receiver = {
            let mut rooms = lock(&self.rooms);
            rooms
                .entry(key.clone())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .subscribe()
        };

        let rooms = Arc::clone(&self.rooms);
        let room_key = key.clone();
        Ok(Subscription::new(key.clone(), receiver, move || {
            let mut rooms = lock(&rooms);
            if rooms
                .get(&room_key)
                .is_some_and(|sender| sender.receiver_count() == 0)
            {
                rooms.remove(&room_key);
            }
        }))
    }

    async fn subscriber_count(&self, key: &SessionKey) -> Result<usize, BusError> {
        Ok(lock(&self.rooms)
            .get(key)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0))
    }
}

impl std::fmt::Debug for InMemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventBus")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
