//! Live-session error types.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

use super::SessionKey;

/// Errors surfaced by live-session operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LiveError {
    /// No live session exists under the key.
    #[error("Live session not found: {0}")]
    NotFound(SessionKey),

    /// A mutation was attempted without a token.
    #[error("Session token required")]
    MissingToken,

    /// The supplied token does not match the session's token.
    #[error("Invalid session token")]
    InvalidToken,

    /// A caller-supplied key is not four digits.
    #[error("Invalid live session key: {0:?}")]
    InvalidKey(String),

    /// Request content failed validation; nothing was applied.
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// No free key could be allocated.
    #[error("No free live session key available")]
    Capacity,

    /// The deck renderer failed.
    #[error("Deck rendering failed: {0}")]
    Render(String),

    /// The artifact file store failed.
    #[error("Artifact storage failed: {0}")]
    Storage(String),

    /// The session store or event bus failed.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl LiveError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LiveError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        LiveError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            LiveError::NotFound(_) => ErrorCode::SessionNotFound,
            LiveError::MissingToken => ErrorCode::Unauthorized,
            LiveError::InvalidToken => ErrorCode::Forbidden,
            LiveError::InvalidKey(_) => ErrorCode::InvalidFormat,
            LiveError::Validation { .. } => ErrorCode::ValidationFailed,
            LiveError::Capacity => ErrorCode::CapacityExhausted,
            LiveError::Render(_) => ErrorCode::RenderFailed,
            LiveError::Storage(_) => ErrorCode::StorageError,
            LiveError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// True for failures the caller caused, as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            LiveError::Capacity
                | LiveError::Render(_)
                | LiveError::Storage(_)
                | LiveError::Infrastructure(_)
        )
    }
}

impl From<ValidationError> for LiveError {
    fn from(err: ValidationError) -> Self {
        LiveError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
