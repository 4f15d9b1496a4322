//! LiveEventBus port - per-session fan-out of events to attached followers.
//!
//! Delivery is decoupled per subscriber: each subscription owns a bounded
//! queue, so a stalled follower can never hold up `publish`. When a queue
//! overflows the oldest events are dropped for that follower only.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::live::{LiveError, LiveEvent, SessionKey};

/// Errors reported by event buses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("Event bus backend error: {0}")]
    Backend(String),

    #[error("Event serialization failed: {0}")]
    Serialization(String),
}

impl From<BusError> for LiveError {
    fn from(err: BusError) -> Self {
        LiveError::Infrastructure(err.to_string())
    }
}

/// Port for publishing and subscribing to session events.
///
/// # Contract
///
/// - For one key, every subscriber observes published events in the same order.
/// - A subscriber sees only events published after `subscribe` returned.
/// - `publish` never waits on a subscriber.
#[async_trait]
pub trait LiveEventBus: Send + Sync {
    /// Delivers `event` to every current subscriber of `key`.
    async fn publish(&self, key: &SessionKey, event: &LiveEvent) -> Result<(), BusError>;

    /// Registers a new listener on `key`.
    async fn subscribe(&self, key: &SessionKey) -> Result<Subscription, BusError>;

    /// Number of listeners currently attached to `key`.
    async fn subscriber_count(&self, key: &SessionKey) -> Result<usize, BusError>;
}

type CancelHook = Box<dyn FnOnce() + Send>;

/// A live registration on a session's channel.
///
/// Events arrive through [`Subscription::recv`]. [`Subscription::cancel`]
/// deregisters the listener; it is idempotent and also runs on drop, so a
/// push stream torn down by its transport always releases its registration.
pub struct Subscription {
    key: SessionKey,
    receiver: Option<broadcast::Receiver<LiveEvent>>,
    on_cancel: Option<CancelHook>,
}

impl Subscription {
    /// Wraps a receiver; `on_cancel` runs once, after the receiver is dropped.
    pub fn new(
        key: SessionKey,
        receiver: broadcast::Receiver<LiveEvent>,
        on_cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            key,
            receiver: Some(receiver),
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// Waits for the next event, in publish order.
    ///
    /// Returns `None` once the subscription is cancelled or the channel is
    /// gone. Events dropped by the overflow policy are logged and skipped.
    pub async fn recv(&mut self) -> Option<LiveEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(key = %self.key, missed, "Follower lagged, dropped oldest events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Deregisters the listener. Safe to call any number of times.
    pub fn cancel(&mut self) {
        self.receiver.take();
        if let Some(hook) = self.on_cancel.take() {
            hook();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.receiver.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
