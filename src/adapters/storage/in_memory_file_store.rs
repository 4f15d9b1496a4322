//! In-Memory File Store
//!
//! Keeps artifacts in a map. Useful for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{validate_file_name, FileStore, StorageError};

#[derive(Debug, Clone)]
pub struct InMemoryFileStore {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    public_url: String,
}

impl InMemoryFileStore {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the stored content of `name`, if any
    pub async fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.files.read().await.contains_key(name)
    }

    /// Get the number of stored files
    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }
}

impl Default for InMemoryFileStore {
    fn default() -> Self {
        Self::new("http://localhost/public")
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn save(&self, name: &str, content: Vec<u8>) -> Result<(), StorageError> {
        validate_file_name(name)?;
        self.files.write().await.insert(name.to_string(), content);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        validate_file_name(name)?;
        self.files
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_url, name)
    }
}
