//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind host")]
    InvalidHost,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Duration must be positive: {0}")]
    InvalidDuration(&'static str),

    #[error("Subscriber capacity must be positive")]
    InvalidSubscriberCapacity,

    #[error("Invalid URL: {0}")]
    InvalidUrl(&'static str),

    #[error("JWT key must be hex-encoded")]
    InvalidJwtKey,

    #[error("JWT key must be at least 32 bytes in production")]
    JwtKeyTooShort,
}
