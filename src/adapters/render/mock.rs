//! Mock deck renderer for testing.
//!
//! Produces predictable artifacts (`deck-1.json`, `deck-2.json`, ...) and can
//! be switched into a failing mode to exercise error paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::deck::DeckRequest;
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::{DeckRenderer, FileStore, RenderError, RenderedDeck};

/// Mock renderer that records calls and optionally saves through a file store.
#[derive(Clone, Default)]
pub struct MockDeckRenderer {
    files: Option<Arc<dyn FileStore>>,
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    last_user: Arc<Mutex<Option<AuthenticatedUser>>>,
}

impl MockDeckRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a small placeholder artifact for every render.
    pub fn with_file_store(mut self, files: Arc<dyn FileStore>) -> Self {
        self.files = Some(files);
        self
    }

    /// Makes subsequent renders fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User passed to the most recent render.
    pub fn last_user(&self) -> Option<AuthenticatedUser> {
        self.last_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DeckRenderer for MockDeckRenderer {
    async fn render(
        &self,
        deck: &DeckRequest,
        user: Option<&AuthenticatedUser>,
    ) -> Result<RenderedDeck, RenderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self
            .last_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = user.cloned();

        if self.fail.load(Ordering::SeqCst) {
            return Err(RenderError::Failed("mock renderer failure".to_string()));
        }

        let file_name = format!("deck-{}.json", n);
        let url = match &self.files {
            Some(files) => {
                files
                    .save(&file_name, deck.date.clone().into_bytes())
                    .await?;
                files.public_url(&file_name)
            }
            None => format!("http://mock/public/{}", file_name),
        };
        Ok(RenderedDeck { file_name, url })
    }
}

impl std::fmt::Debug for MockDeckRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDeckRenderer")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}
