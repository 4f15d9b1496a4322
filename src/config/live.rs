//! Live session configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timing and fan-out settings for live sessions.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    /// Unattended sessions idle longer than this are swept
    #[serde(default = "default_max_idle")]
    pub max_idle_secs: u64,

    /// How often the idle sweep runs
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Quiet time before a push stream sends `keepAlive`
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,

    /// Reconnect hint sent as the first stream frame, in milliseconds
    #[serde(default = "default_retry_ms")]
    pub retry_ms: u64,

    /// Events buffered per follower before the oldest are dropped
    #[serde(default = "default_subscriber_capacity")]
    pub subscriber_capacity: usize,

    /// Base URL of the follower front end
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl LiveConfig {
    pub fn max_idle(&self) -> Duration {
        Duration::from_secs(self.max_idle_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms)
    }

    /// Follower link for a session key.
    pub fn follower_url(&self, key: &str) -> String {
        format!("{}/live/{}", self.frontend_url.trim_end_matches('/'), key)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_idle_secs == 0 {
            return Err(ValidationError::InvalidDuration("max_idle_secs"));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ValidationError::InvalidDuration("cleanup_interval_secs"));
        }
        if self.keep_alive_secs == 0 {
            return Err(ValidationError::InvalidDuration("keep_alive_secs"));
        }
        if self.subscriber_capacity == 0 {
            return Err(ValidationError::InvalidSubscriberCapacity);
        }
        if !self.frontend_url.starts_with("http://") && !self.frontend_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("frontend_url"));
        }
        Ok(())
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            max_idle_secs: default_max_idle(),
            cleanup_interval_secs: default_cleanup_interval(),
            keep_alive_secs: default_keep_alive(),
            retry_ms: default_retry_ms(),
            subscriber_capacity: default_subscriber_capacity(),
            frontend_url: default_frontend_url(),
        }
    }
}

fn default_max_idle() -> u64 {
    2 * 60 * 60
}

fn default_cleanup_interval() -> u64 {
    30 * 60
}

fn default_keep_alive() -> u64 {
    15
}

fn default_retry_ms() -> u64 {
    5_000
}

fn default_subscriber_capacity() -> usize {
    32
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LiveConfig::default();
        assert_eq!(config.max_idle(), Duration::from_secs(7_200));
        assert_eq!(config.cleanup_interval(), Duration::from_secs(1_800));
        assert_eq!(config.keep_alive(), Duration::from_secs(15));
        assert_eq!(config.retry(), Duration::from_millis(5_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_follower_url() {
        let config = LiveConfig {
            frontend_url: "https://deck.example.org/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.follower_url("0042"), "https://deck.example.org/live/0042");
    }

    #[test]
    fn test_validation_rejects_zero_durations() {
        let config = LiveConfig {
            max_idle_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LiveConfig {
            subscriber_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
