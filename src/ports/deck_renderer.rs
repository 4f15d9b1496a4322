//! DeckRenderer port - turns a deck request into a displayable artifact.
//!
//! Layout, pagination and encoding live behind this port. A live session
//! only needs the artifact's file name (to release it later) and its URL
//! (to hand to followers).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::deck::DeckRequest;
use crate::domain::foundation::AuthenticatedUser;
use crate::domain::live::LiveError;

use super::StorageError;

/// Location of a rendered deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDeck {
    pub file_name: String,
    pub url: String,
}

/// Errors from deck rendering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The deck references content that cannot be resolved.
    #[error("Deck cannot be rendered: {0}")]
    InvalidDeck(String),

    #[error("Rendering failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<RenderError> for LiveError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::InvalidDeck(message) => LiveError::validation("deck", message),
            RenderError::Storage(e) => LiveError::Storage(e.to_string()),
            RenderError::Failed(message) => LiveError::Render(message),
        }
    }
}

/// Port for rendering decks.
///
/// Implementations save the artifact themselves; on error nothing is left
/// behind.
#[async_trait]
pub trait DeckRenderer: Send + Sync {
    /// Renders `deck` on behalf of `user` (anonymous when `None`).
    async fn render(
        &self,
        deck: &DeckRequest,
        user: Option<&AuthenticatedUser>,
    ) -> Result<RenderedDeck, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn DeckRenderer) {}

    #[test]
    fn invalid_deck_is_a_validation_failure() {
        let err: LiveError = RenderError::InvalidDeck("unknown song".into()).into();
        assert!(matches!(err, LiveError::Validation { .. }));

        let err: LiveError = RenderError::Failed("font missing".into()).into();
        assert!(matches!(err, LiveError::Render(_)));
    }
}
