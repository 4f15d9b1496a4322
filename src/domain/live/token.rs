//! Session token: the secret that authorizes every mutation of a session.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;

/// Number of random bytes behind a token.
const TOKEN_BYTES: usize = 16;

/// Opaque secret generated when a session is created.
///
/// Immutable for the lifetime of the session. `Debug` redacts the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generates a fresh token from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wraps a token read back from a store.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token for handing to the presenter or persisting.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Compares a candidate against this token in constant time.
    ///
    /// The running time depends only on the lengths, never on how many
    /// leading bytes match.
    pub fn verify(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_url_safe_and_unique() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();

        assert_ne!(a, b);
        assert_eq!(a.expose().len(), 22);
        assert!(a
            .expose()
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_'));
    }

    #[test]
    fn verify_accepts_exact_match_only() {
        let token = SessionToken::from_stored("s3cr3t-token");

        assert!(token.verify("s3cr3t-token"));
        assert!(!token.verify("s3cr3t-tokeN"));
        assert!(!token.verify("s3cr3t"));
        assert!(!token.verify(""));
        assert!(!token.verify("s3cr3t-token-and-more"));
    }

    #[test]
    fn debug_does_not_leak_value() {
        let token = SessionToken::from_stored("do-not-print");
        assert!(!format!("{:?}", token).contains("do-not-print"));
    }
}
