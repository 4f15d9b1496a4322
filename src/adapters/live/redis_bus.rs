//! Redis pub/sub event bus.
//!
//! Events for a session travel over `live_session_channel:{key}` as JSON, so
//! followers attached to any server instance see every change. Each
//! subscription holds its own pub/sub connection; a forwarding task feeds
//! its messages into a bounded local queue with the same drop-oldest policy
//! as the in-process bus.

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::{broadcast, oneshot};

use crate::domain::live::{LiveEvent, SessionKey};
use crate::ports::{BusError, LiveEventBus, Subscription};

/// Prefix of every session channel.
pub const CHANNEL_PREFIX: &str = "live_session_channel:";

fn channel(key: &SessionKey) -> String {
    format!("{}{}", CHANNEL_PREFIX, key)
}

fn backend(e: redis::RedisError) -> BusError {
    BusError::Backend(e.to_string())
}

/// Redis-backed event bus for multi-instance deployments.
#[derive(Clone)]
pub struct RedisEventBus {
    client: redis::Client,
    conn: MultiplexedConnection,
    capacity: usize,
}

impl RedisEventBus {
    /// `conn` is used for publishing and counting; subscriptions open their
    /// own connections from `client`.
    pub fn new(client: redis::Client, conn: MultiplexedConnection, capacity: usize) -> Self {
        Self {
            client,
            conn,
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl LiveEventBus for RedisEventBus {
    async fn publish(&self, key: &SessionKey, event: &LiveEvent) -> Result<(), BusError> {
        let payload =
            serde_json::to_string(event).map_err(|e| BusError::Serialization(e.to_string()))?;
        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(channel(key), payload).await.map_err(backend)?;
        tracing::trace!(key = %key, event = event.name(), receivers, "Published live event");
        Ok(())
    }

    async fn subscribe(&self, key: &SessionKey) -> Result<Subscription, BusError> {
        let mut pubsub = self
            .client
            .get_async_connection()
            .await
            .map_err(backend)?
            .into_pubsub();
        // SUBSCRIBE is acknowledged before this returns, so nothing published
        // afterwards can be missed.
        pubsub.subscribe(channel(key)).await.map_err(backend)?;

        let (tx, rx) = broadcast::channel(self.capacity);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task_key = key.clone();

        tokio::spawn(async move {
            let mut messages = pubsub.into_on_message();
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    message = messages.next() => {
                        let Some(message) = message else {
                            tracing::warn!(key = %task_key, "Pub/sub connection closed");
                            break;
                        };
                        let payload: String = match message.get_payload() {
                            Ok(payload) => payload,
                            Err(e) => {
                                tracing::warn!(key = %task_key, error = %e, "Unreadable pub/sub payload");
                                continue;
                            }
                        };
                        match serde_json::from_str::<LiveEvent>(&payload) {
                            Ok(event) => {
                                if tx.send(event).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(key = %task_key, error = %e, "Malformed live event on channel");
                            }
                        }
                    }
                }
            }
            tracing::debug!(key = %task_key, "Pub/sub forwarder stopped");
        });

        Ok(Subscription::new(key.clone(), rx, move || {
            let _ = stop_tx.send(());
        }))
    }

    async fn subscriber_count(&self, key: &SessionKey) -> Result<usize, BusError> {
        let mut conn = self.conn.clone();
        let counts: Vec<(String, usize)> = redis::cmd("PUBSUB")
            .arg("NUMSUB")
            .arg(channel(key))
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(counts.first().map(|(_, count)| *count).unwrap_or(0))
    }
}

impl std::fmt::Debug for RedisEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventBus")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
