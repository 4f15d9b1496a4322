//! In-Memory Live Session Store
//!
//! Keeps session records in a process-local map. Useful for tests and
//! single-instance deployments without Redis.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::domain::live::{LiveSession, SessionKey};
use crate::ports::{ExpiredSession, LiveEventBus, LiveSessionStore, StoreError, MAX_KEY_ATTEMPTS};

/// In-memory storage for live sessions
#[derive(Debug, Clone, Default)]
pub struct InMemoryLiveSessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, LiveSession>>>,
}

impl InMemoryLiveSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl LiveSessionStore for InMemoryLiveSessionStore {
    async fn create_session(&self, session: &LiveSession) -> Result<SessionKey, StoreError> {
        // Holding the write lock makes check-and-insert indivisible.
        let mut sessions = self.sessions.write().await;
        for _ in 0..MAX_KEY_ATTEMPTS {
            let candidate = SessionKey::random();
            if !sessions.contains_key(&candidate) {
                sessions.insert(candidate.clone(), session.clone());
                return Ok(candidate);
            }
        }
        Err(StoreError::Capacity {
            attempts: MAX_KEY_ATTEMPTS,
        })
    }

    async fn insert_session(
        &self,
        key: &SessionKey,
        session: &LiveSession,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(key) {
            return Err(StoreError::KeyTaken(key.clone()));
        }
        sessions.insert(key.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, key: &SessionKey) -> Result<LiveSession, StoreError> {
        self.sessions
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn update_session(
        &self,
        key: &SessionKey,
        session: &LiveSession,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let previous_touch = stored.updated_at();
        *stored = session.clone();
        stored.touch(previous_touch);
        Ok(())
    }

    async fn change_session_page(
        &self,
        key: &SessionKey,
        page: u32,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        stored.set_page(page, now);
        Ok(())
    }

    async fn delete_session(&self, key: &SessionKey) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    async fn clean_up(
        &self,
        older_than: Timestamp,
        bus: &dyn LiveEventBus,
    ) -> Result<Vec<ExpiredSession>, StoreError> {
        let candidates: Vec<SessionKey> = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(_, session)| session.is_idle_since(older_than))
            .map(|(key, _)| key.clone())
            .collect();

        let mut expired = Vec::new();
        for key in candidates {
            match bus.subscriber_count(&key).await {
                Ok(0) => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Subscriber count unavailable, keeping session");
                    continue;
                }
            }

            // Re-check under the write lock: the session may have been
            // touched since it was listed.
            let mut sessions = self.sessions.write().await;
            if sessions
                .get(&key)
                .is_some_and(|session| session.is_idle_since(older_than))
            {
                if let Some(session) = sessions.remove(&key) {
                    expired.push(ExpiredSession {
                        key,
                        file_name: session.file_name().to_string(),
                    });
                }
            }
        }
        Ok(expired)
    }
}
