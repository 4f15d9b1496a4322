//! Idle session sweep.
//!
//! Runs [`LiveSessionService::clean_up`] on a fixed interval for the life of
//! the process. A failed sweep is logged and retried on the next tick.
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a watch channel and returns once `true` is sent.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::LiveSessionService;

/// Background task that periodically removes idle, unattended sessions.
pub struct CleanupScheduler {
    service: Arc<LiveSessionService>,
    interval: Duration,
}

impl CleanupScheduler {
    pub fn new(service: Arc<LiveSessionService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run the sweep loop until shutdown signal is received.
    ///
    /// The first sweep happens one full interval after start.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval_at(time::Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Cleanup scheduler stopped");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.sweep().await;
                }
            }
        }
    }

    /// One sweep. Errors are logged, never propagated.
    pub async fn sweep(&self) -> usize {
        match self.service.clean_up().await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(error = %e, "Idle live session sweep failed");
                0
            }
        }
    }
}
