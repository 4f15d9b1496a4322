//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum HMAC key length in bytes.
const MIN_KEY_BYTES: usize = 32;

/// Presenter identity configuration.
///
/// Without a key, bearer credentials are ignored and every presenter is
/// anonymous.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Hex-encoded HS256 key used to verify presenter tokens
    pub jwt_key: Option<SecretString>,
}

impl AuthConfig {
    pub fn is_enabled(&self) -> bool {
        self.jwt_key.is_some()
    }

    /// Validate authentication configuration
    ///
    /// A configured key must be hex; production additionally requires at
    /// least 32 bytes of key material.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let Some(key) = &self.jwt_key else {
            return Ok(());
        };
        let bytes =
            hex::decode(key.expose_secret().trim()).map_err(|_| ValidationError::InvalidJwtKey)?;
        if bytes.is_empty() {
            return Err(ValidationError::InvalidJwtKey);
        }
        if *environment == Environment::Production && bytes.len() < MIN_KEY_BYTES {
            return Err(ValidationError::JwtKeyTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_key(key: &str) -> AuthConfig {
        AuthConfig {
            jwt_key: Some(SecretString::new(key.to_string())),
        }
    }

    #[test]
    fn test_absent_key_is_valid() {
        let config = AuthConfig::default();
        assert!(!config.is_enabled());
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_non_hex_key_rejected() {
        assert!(matches!(
            with_key("not-hex").validate(&Environment::Development),
            Err(ValidationError::InvalidJwtKey)
        ));
    }

    #[test]
    fn test_short_key_only_rejected_in_production() {
        let config = with_key("abcd");
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(matches!(
            config.validate(&Environment::Production),
            Err(ValidationError::JwtKeyTooShort)
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = with_key("abcdef");
        assert!(!format!("{:?}", config).contains("abcdef"));
    }
}
