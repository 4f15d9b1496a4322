//! Identity types for the domain layer.
//!
//! A presenter may be anonymous or signed in. When a bearer credential is
//! presented and accepted, the HTTP layer produces an [`AuthenticatedUser`]
//! which is only passed through to the deck renderer (it can resolve the
//! user's private songs); live sessions themselves are authorized by their
//! own session token, never by user identity.

use super::UserId;
use thiserror::Error;

/// User extracted from a validated bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the credential's subject.
    pub id: UserId,

    /// User's email address, when the credential carries one.
    pub email: Option<String>,

    /// Display name, when the credential carries one.
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: Option<String>, display_name: Option<String>) -> Self {
        Self {
            id,
            email,
            display_name,
        }
    }

    /// Returns a human-facing label: display name, then email, then the raw id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Errors that can occur while validating a bearer credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The credential is malformed or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The credential has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The identity service is misconfigured or unreachable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user_id() -> UserId {
        UserId::new("user-123").unwrap()
    }

    #[test]
    fn label_prefers_display_name() {
        let user = AuthenticatedUser::new(
            test_user_id(),
            Some("alice@example.com".to_string()),
            Some("Alice".to_string()),
        );
        assert_eq!(user.label(), "Alice");
    }

    #[test]
    fn label_falls_back_to_email_then_id() {
        let user = AuthenticatedUser::new(test_user_id(), Some("bob@example.com".to_string()), None);
        assert_eq!(user.label(), "bob@example.com");

        let user = AuthenticatedUser::new(test_user_id(), None, None);
        assert_eq!(user.label(), "user-123");
    }

    #[test]
    fn auth_error_displays_correctly() {
        assert_eq!(format!("{}", AuthError::InvalidToken), "Invalid or expired token");
        assert_eq!(format!("{}", AuthError::TokenExpired), "Token expired");
        assert_eq!(
            format!("{}", AuthError::service_unavailable("no key")),
            "Auth service unavailable: no key"
        );
    }

    #[test]
    fn auth_error_is_transient_only_for_service_errors() {
        assert!(AuthError::service_unavailable("timeout").is_transient());
        assert!(!AuthError::InvalidToken.is_transient());
        assert!(!AuthError::TokenExpired.is_transient());
    }
}
