//! HS256 JWT adapter for presenter identity.
//!
//! Presenters sign in elsewhere and receive a JWT signed with a shared HMAC
//! key. This adapter verifies the signature and expiry and maps the claims
//! to an [`AuthenticatedUser`].

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Claims carried by presenter tokens.
#[derive(Debug, Deserialize)]
struct PresenterClaims {
    /// Subject - the user ID
    sub: String,

    #[allow(dead_code)]
    exp: i64,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    name: Option<String>,
}

/// Validates HS256-signed presenter tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    /// Builds a validator from a hex-encoded HMAC key.
    pub fn from_hex_key(hex_key: &SecretString) -> Result<Self, AuthError> {
        let key = hex::decode(hex_key.expose_secret().trim())
            .map_err(|e| AuthError::service_unavailable(format!("jwt key is not hex: {}", e)))?;
        if key.is_empty() {
            return Err(AuthError::service_unavailable("jwt key is empty"));
        }
        Ok(Self::from_secret(&key))
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<PresenterClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Presenter token expired");
                        AuthError::TokenExpired
                    }
                    _ => {
                        tracing::warn!("Presenter token rejected: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;
        let claims = data.claims;

        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Presenter token has an empty subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email, claims.name))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &[u8] = b"presenter-signing-key";

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
    }

    fn token(sub: &str, exp_offset: i64, secret: &[u8]) -> String {
        let claims = Claims {
            sub,
            exp: chrono::Utc::now().timestamp() + exp_offset,
            name: Some("Anna"),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let validator = JwtSessionValidator::from_secret(SECRET);

        let user = validator.validate(&token("user-1", 600, SECRET)).await.unwrap();

        assert_eq!(user.id.as_str(), "user-1");
        assert_eq!(user.display_name.as_deref(), Some("Anna"));
        assert_eq!(user.email, None);
    }

    #[tokio::test]
    async fn rejects_wrong_signature() {
        let validator = JwtSessionValidator::from_secret(SECRET);
        let result = validator.validate(&token("user-1", 600, b"other-key")).await;
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn reports_expired_token() {
        let validator = JwtSessionValidator::from_secret(SECRET);
        let result = validator.validate(&token("user-1", -3_600, SECRET)).await;
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let validator = JwtSessionValidator::from_secret(SECRET);
        assert_eq!(
            validator.validate("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn hex_key_must_decode() {
        let bad = SecretString::new("zz-not-hex".to_string());
        assert!(matches!(
            JwtSessionValidator::from_hex_key(&bad),
            Err(AuthError::ServiceUnavailable(_))
        ));

        let good = SecretString::new(hex::encode(SECRET));
        assert!(JwtSessionValidator::from_hex_key(&good).is_ok());
    }
}
