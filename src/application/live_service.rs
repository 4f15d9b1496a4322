//! LiveSessionService - orchestrates the live session lifecycle.
//!
//! Every mutation follows the same sequence: authorize against the session
//! token, apply the change to the store, then publish. Publishing happens
//! only after the store reflects the change, so a follower that reacts to
//! an event by re-reading the session always sees the new state.
//! Publish failures are logged and never fail the mutation.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::deck::LiveSessionRequest;
use crate::domain::foundation::{AuthenticatedUser, Timestamp};
use crate::domain::live::{LiveError, LiveEvent, LiveSession, SessionKey, SessionToken};
use crate::ports::{
    DeckRenderer, FileStore, LiveEventBus, LiveSessionStore, RenderedDeck, StoreError, Subscription,
};

/// Key and token handed to the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub key: SessionKey,
    pub token: SessionToken,
}

/// Result of a create-or-update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Created(SessionHandle),
    Updated(SessionHandle),
}

impl PutOutcome {
    pub fn handle(&self) -> &SessionHandle {
        match self {
            PutOutcome::Created(handle) | PutOutcome::Updated(handle) => handle,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, PutOutcome::Created(_))
    }
}

/// A follower's attachment: what to show now, and what comes next.
#[derive(Debug)]
pub struct LiveSubscription {
    /// Synthetic `start` event built from the record at attach time.
    pub snapshot: LiveEvent,
    pub subscription: Subscription,
}

/// Application service for live sessions.
pub struct LiveSessionService {
    store: Arc<dyn LiveSessionStore>,
    bus: Arc<dyn LiveEventBus>,
    renderer: Arc<dyn DeckRenderer>,
    files: Arc<dyn FileStore>,
    max_idle: Duration,
}

impl LiveSessionService {
    pub fn new(
        store: Arc<dyn LiveSessionStore>,
        bus: Arc<dyn LiveEventBus>,
        renderer: Arc<dyn DeckRenderer>,
        files: Arc<dyn FileStore>,
        max_idle: Duration,
    ) -> Self {
        Self {
            store,
            bus,
            renderer,
            files,
            max_idle,
        }
    }

    /// A well-formed key to show a presenter ahead of time. Not reserved.
    pub fn generate_candidate_key(&self) -> SessionKey {
        SessionKey::random()
    }

    pub fn validate_key_format(&self, key: &str) -> bool {
        SessionKey::is_valid_format(key)
    }

    /// Renders the deck and stores a new session under a fresh key.
    ///
    /// Nothing is left behind on failure: the artifact is released when the
    /// store rejects the record.
    pub async fn create_session(
        &self,
        request: &LiveSessionRequest,
        user: Option<&AuthenticatedUser>,
    ) -> Result<SessionHandle, LiveError> {
        let page = request.validate()?;
        let rendered = self.renderer.render(&request.deck, user).await?;
        let token = SessionToken::generate();
        let session = new_session(&rendered, page, token.clone());

        let key = match self.store.create_session(&session).await {
            Ok(key) => key,
            Err(e) => {
                self.release_artifact(&rendered.file_name).await;
                return Err(e.into());
            }
        };

        tracing::info!(key = %key, file_name = %rendered.file_name, "Live session created");
        Ok(SessionHandle { key, token })
    }

    /// Like [`create_session`](Self::create_session) but under a key the
    /// presenter picked.
    pub async fn create_session_with_key(
        &self,
        key: &SessionKey,
        request: &LiveSessionRequest,
        user: Option<&AuthenticatedUser>,
    ) -> Result<SessionHandle, ClaimError> {
        let page = request.validate().map_err(LiveError::from)?;
        let rendered = self
            .renderer
            .render(&request.deck, user)
            .await
            .map_err(LiveError::from)?;
        let token = SessionToken::generate();
        let session = new_session(&rendered, page, token.clone());

        if let Err(e) = self.store.insert_session(key, &session).await {
            self.release_artifact(&rendered.file_name).await;
            return Err(match e {
                StoreError::KeyTaken(_) => ClaimError::KeyTaken,
                other => ClaimError::Failed(other.into()),
            });
        }

        tracing::info!(key = %key, file_name = %rendered.file_name, "Live session created with chosen key");
        Ok(SessionHandle {
            key: key.clone(),
            token,
        })
    }

    /// Creates the session under `raw_key` if it does not exist yet,
    /// otherwise updates it after verifying `token`.
    pub async fn put_session(
        &self,
        raw_key: &str,
        request: &LiveSessionRequest,
        token: &str,
        user: Option<&AuthenticatedUser>,
    ) -> Result<PutOutcome, LiveError> {
        let key =
            SessionKey::parse(raw_key).map_err(|_| LiveError::InvalidKey(raw_key.to_string()))?;

        match self.store.get_session(&key).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => {
                match self.create_session_with_key(&key, request, user).await {
                    Ok(handle) => return Ok(PutOutcome::Created(handle)),
                    // Lost a race with another creator: treat as an update.
                    Err(ClaimError::KeyTaken) => {}
                    Err(ClaimError::Failed(e)) => return Err(e),
                }
            }
            Err(e) => return Err(e.into()),
        }

        let handle = self.update_session(&key, request, token, user).await?;
        Ok(PutOutcome::Updated(handle))
    }

    /// Replaces the deck of an existing session and tells followers.
    ///
    /// On failure the stored record is left as it was.
    pub async fn update_session(
        &self,
        key: &SessionKey,
        request: &LiveSessionRequest,
        token: &str,
        user: Option<&AuthenticatedUser>,
    ) -> Result<SessionHandle, LiveError> {
        let page = request.validate()?;
        let mut session = self.authorize(key, token).await?;

        let rendered = self.renderer.render(&request.deck, user).await?;
        let previous_file =
            session.replace_deck(&rendered.url, &rendered.file_name, page, Timestamp::now());

        if let Err(e) = self.store.update_session(key, &session).await {
            self.release_artifact(&rendered.file_name).await;
            return Err(e.into());
        }
        if previous_file != rendered.file_name {
            self.release_artifact(&previous_file).await;
        }

        tracing::info!(key = %key, file_name = %rendered.file_name, page, "Live session updated");
        self.publish(key, &session.start_event()).await;

        Ok(SessionHandle {
            key: key.clone(),
            token: session.token().clone(),
        })
    }

    /// Moves followers to another page.
    pub async fn change_page(&self, key: &SessionKey, page: u32, token: &str) -> Result<(), LiveError> {
        self.authorize(key, token).await?;
        self.store
            .change_session_page(key, page, Timestamp::now())
            .await?;

        tracing::debug!(key = %key, page, "Live session page changed");
        self.publish(key, &LiveEvent::ChangePage { page }).await;
        Ok(())
    }

    /// Ends a session: removes the record, tells followers, frees the artifact.
    pub async fn delete_session(&self, key: &SessionKey, token: &str) -> Result<(), LiveError> {
        let session = self.authorize(key, token).await?;
        self.store.delete_session(key).await?;

        tracing::info!(key = %key, "Live session deleted");
        self.publish(key, &LiveEvent::Delete).await;
        self.release_artifact(session.file_name()).await;
        Ok(())
    }

    /// Attaches a follower. No token needed.
    ///
    /// The bus registration happens before the snapshot is read, so no
    /// change can fall between the two. A change racing the attach may be
    /// seen twice (in the snapshot and as an event), never zero times.
    pub async fn subscribe(&self, key: &SessionKey) -> Result<LiveSubscription, LiveError> {
        let subscription = self.bus.subscribe(key).await?;
        let session = self.store.get_session(key).await?;

        tracing::debug!(key = %key, "Follower attached");
        Ok(LiveSubscription {
            snapshot: session.start_event(),
            subscription,
        })
    }

    pub async fn get_session(&self, key: &SessionKey) -> Result<LiveSession, LiveError> {
        Ok(self.store.get_session(key).await?)
    }

    /// Removes sessions idle longer than the configured maximum that nobody
    /// is following. Returns how many were removed.
    pub async fn clean_up(&self) -> Result<usize, LiveError> {
        self.clean_up_at(Timestamp::now()).await
    }

    /// [`clean_up`](Self::clean_up) against an explicit clock reading.
    pub async fn clean_up_at(&self, now: Timestamp) -> Result<usize, LiveError> {
        let cutoff = now.minus(self.max_idle);
        let expired = self.store.clean_up(cutoff, self.bus.as_ref()).await?;

        for session in &expired {
            self.publish(&session.key, &LiveEvent::Delete).await;
            self.release_artifact(&session.file_name).await;
        }

        tracing::info!(removed = expired.len(), "Idle live session sweep finished");
        Ok(expired.len())
    }

    /// Loads the session and checks `token` against it.
    async fn authorize(&self, key: &SessionKey, token: &str) -> Result<LiveSession, LiveError> {
        let session = self.store.get_session(key).await?;
        if token.is_empty() {
            tracing::warn!(key = %key, "Live session mutation without token");
            return Err(LiveError::MissingToken);
        }
        if !session.token().verify(token) {
            tracing::warn!(key = %key, "Live session token rejected");
            return Err(LiveError::InvalidToken);
        }
        Ok(session)
    }

    async fn publish(&self, key: &SessionKey, event: &LiveEvent) {
        if let Err(e) = self.bus.publish(key, event).await {
            tracing::warn!(key = %key, event = event.name(), error = %e, "Failed to publish live event");
        }
    }

    async fn release_artifact(&self, file_name: &str) {
        if file_name.is_empty() {
            return;
        }
        if let Err(e) = self.files.delete(file_name).await {
            tracing::warn!(file_name = %file_name, error = %e, "Failed to release deck artifact");
        }
    }
}

/// Error of [`LiveSessionService::create_session_with_key`]: the key may
/// already be claimed, which callers usually want to handle separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    KeyTaken,
    Failed(LiveError),
}

impl From<LiveError> for ClaimError {
    fn from(err: LiveError) -> Self {
        ClaimError::Failed(err)
    }
}

impl From<ClaimError> for LiveError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::KeyTaken => LiveError::validation("key", "key already in use"),
            ClaimError::Failed(e) => e,
        }
    }
}

fn new_session(rendered: &RenderedDeck, page: u32, token: SessionToken) -> LiveSession {
    LiveSession::new(
        &rendered.url,
        &rendered.file_name,
        page,
        token,
        Timestamp::now(),
    )
}
