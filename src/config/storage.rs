//! Artifact storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where rendered decks are written and served from.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory served under `/public`
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Public base URL of that directory
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.public_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE__PUBLIC_DIR"));
        }
        if !self.public_url.starts_with("http://") && !self.public_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("public_url"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            public_url: default_public_url(),
        }
    }
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_public_url() -> String {
    "http://localhost:8080/public".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StorageConfig::default();
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_relative_public_url() {
        let config = StorageConfig {
            public_url: "/public".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
