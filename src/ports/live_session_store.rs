//! LiveSessionStore port - durable or in-memory record of live sessions.
//!
//! The store owns key allocation. Allocation must be atomic: two concurrent
//! `create_session` calls, from this process or from another instance
//! sharing the backend, never receive the same key.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::Timestamp;
use crate::domain::live::{LiveError, LiveSession, SessionKey};

use super::LiveEventBus;

/// Random candidates tried before key allocation gives up.
pub const MAX_KEY_ATTEMPTS: usize = 100;

/// Errors reported by session stores.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Live session not found: {0}")]
    NotFound(SessionKey),

    #[error("Live session key already in use: {0}")]
    KeyTaken(SessionKey),

    #[error("No free key found after {attempts} attempts")]
    Capacity { attempts: usize },

    #[error("Session store backend error: {0}")]
    Backend(String),

    #[error("Stored session {key} is corrupt: {reason}")]
    Corrupt { key: SessionKey, reason: String },
}

impl From<StoreError> for LiveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => LiveError::NotFound(key),
            StoreError::Capacity { .. } => LiveError::Capacity,
            other => LiveError::Infrastructure(other.to_string()),
        }
    }
}

/// A session removed by the idle sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredSession {
    pub key: SessionKey,
    /// Artifact to release.
    pub file_name: String,
}

/// Port for storing live session records.
///
/// # Contract
///
/// - `create_session` allocates an unused random key in one indivisible step,
///   trying at most [`MAX_KEY_ATTEMPTS`] candidates before `Capacity`.
/// - `insert_session` claims a caller-chosen key, failing with `KeyTaken`.
/// - `update_session` and `change_session_page` fail with `NotFound` for
///   absent keys and never create records.
/// - `clean_up` removes records idle since before `older_than` that have no
///   attached subscriber on `bus`, and reports them.
#[async_trait]
pub trait LiveSessionStore: Send + Sync {
    /// Stores a record under a freshly allocated key.
    async fn create_session(&self, session: &LiveSession) -> Result<SessionKey, StoreError>;

    /// Stores a record under a pre-agreed key.
    async fn insert_session(
        &self,
        key: &SessionKey,
        session: &LiveSession,
    ) -> Result<(), StoreError>;

    async fn get_session(&self, key: &SessionKey) -> Result<LiveSession, StoreError>;

    /// Full replace of an existing record.
    async fn update_session(
        &self,
        key: &SessionKey,
        session: &LiveSession,
    ) -> Result<(), StoreError>;

    /// Partial update: page and idle clock only.
    async fn change_session_page(
        &self,
        key: &SessionKey,
        page: u32,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    async fn delete_session(&self, key: &SessionKey) -> Result<(), StoreError>;

    /// Removes stale, unattended sessions.
    async fn clean_up(
        &self,
        older_than: Timestamp,
        bus: &dyn LiveEventBus,
    ) -> Result<Vec<ExpiredSession>, StoreError>;
}
