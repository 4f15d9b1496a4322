//! Shared backend settings

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Present only when several server instances share sessions and events
/// through Redis. Without it the in-memory backends are used.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,

    /// How long startup waits for the first connection
    #[serde(default = "default_connect_timeout")]
    pub timeout_secs: u64,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_connect_timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let scheme = self.url.split_once("://").map(|(scheme, _)| scheme);
        match scheme {
            _ if self.url.trim().is_empty() => {
                Err(ValidationError::MissingRequired("REDIS__URL"))
            }
            Some("redis" | "rediss") if self.timeout_secs > 0 => Ok(()),
            Some("redis" | "rediss") => Err(ValidationError::InvalidTimeout),
            _ => Err(ValidationError::InvalidRedisUrl),
        }
    }
}

fn default_connect_timeout() -> u64 {
    5
}
