//! Local Filesystem File Store - serves rendered decks from a public directory.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::ports::{validate_file_name, FileStore, StorageError};

/// Stores artifacts as flat files under `base_path`, published at `public_url`.
///
/// # Atomic Writes
///
/// Content is written to `.{name}.tmp`, synced, then renamed into place, so
/// the static file server never hands out a half-written deck. Temp files
/// start with a dot and are never valid artifact names.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    base_path: PathBuf,
    public_url: String,
}

impl LocalFileStore {
    pub fn new(base_path: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!(".{}.tmp", name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, name: &str, content: Vec<u8>) -> Result<(), StorageError> {
        validate_file_name(name)?;

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::io(format!(
                "Failed to create directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let temp_path = self.temp_path(name);
        let final_path = self.file_path(name);

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            StorageError::io(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        file.write_all(&content).await.map_err(|e| {
            StorageError::io(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::io(format!("Failed to sync {}: {}", temp_path.display(), e))
        })?;

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            )));
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        validate_file_name(name)?;
        let path = self.file_path(name);
        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::io(format!("Failed to delete {}: {}", path.display(), e)),
        })
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_url, name)
    }
}
