//! Identity port: validates bearer credentials.
//!
//! Presenters may attach a bearer credential to create/update requests. The
//! resulting user is only passed through to the deck renderer; session
//! mutations are authorized by the session token, not by identity.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed or badly signed tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for misconfiguration or transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw bearer token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
