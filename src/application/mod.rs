//! Application layer - orchestration over the ports.
//!
//! - `LiveSessionService` - token-gated session lifecycle and follower attach
//! - `CleanupScheduler` - periodic idle-session sweep

mod cleanup;
mod live_service;

pub use cleanup::CleanupScheduler;
pub use live_service::{ClaimError, LiveSessionService, LiveSubscription, PutOutcome, SessionHandle};
