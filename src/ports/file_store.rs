//! FileStore port - named, publicly served artifacts.
//!
//! Rendered decks are saved under a flat file name and served from a public
//! base URL. Live sessions release their artifact when the deck is replaced
//! and when the session ends.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::live::LiveError;

/// Errors from artifact storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl StorageError {
    pub fn io(message: impl Into<String>) -> Self {
        StorageError::Io(message.into())
    }
}

impl From<StorageError> for LiveError {
    fn from(err: StorageError) -> Self {
        LiveError::Storage(err.to_string())
    }
}

/// Port for saving and releasing public artifacts.
///
/// # Contract
///
/// - Names are flat (no path separators); anything else is `InvalidName`.
/// - `save` is atomic: readers never observe a partially written file.
/// - `delete` of a missing file reports `NotFound`.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn save(&self, name: &str, content: Vec<u8>) -> Result<(), StorageError>;

    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Public URL under which `name` is served.
    fn public_url(&self, name: &str) -> String;
}

/// Checks that `name` is a single, non-hidden path component.
pub fn validate_file_name(name: &str) -> Result<(), StorageError> {
    let ok = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_flat_names() {
        assert!(validate_file_name("0b6f.json").is_ok());
        assert!(validate_file_name("deck-1.pdf").is_ok());
    }

    #[test]
    fn rejects_traversal_and_hidden_names() {
        for name in ["", "../etc/passwd", "a/b.pdf", "a\\b", ".env", ".."] {
            assert!(validate_file_name(name).is_err(), "accepted {:?}", name);
        }
    }
}
