//! Request and response DTOs for the live session endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ErrorCode;
use crate::domain::live::LiveError;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// `?token=` on PUT and DELETE.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenQuery {
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }
}

/// `?token=&page=` on the page route.
///
/// `page` stays a string so a malformed value is reported by the handler
/// rather than rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    /// The requested page, if it is a non-negative integer.
    pub fn page(&self) -> Option<u32> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// What a presenter gets back from create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub key: String,
    /// Follower link for this session.
    pub url: String,
    pub token: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn not_found(key: &str) -> Self {
        Self::new(ErrorCode::SessionNotFound, format!("Live session not found: {}", key))
    }

    /// Client-facing body for a domain error. Server faults get a generic
    /// message so backend details never leak.
    pub fn from_live_error(err: &LiveError) -> Self {
        if !err.is_client_error() {
            return Self::new(err.code(), "Internal server error");
        }
        let mut response = Self::new(err.code(), err.to_string());
        if let LiveError::Validation { field, .. } = err {
            response.details = Some(serde_json::json!({ "field": field }));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::live::SessionKey;

    #[test]
    fn page_query_parses_non_negative_integers_only() {
        let query = |page: &str| PageQuery {
            token: None,
            page: Some(page.to_string()),
        };
        assert_eq!(query("3").page(), Some(3));
        assert_eq!(query("0").page(), Some(0));
        assert_eq!(query("-1").page(), None);
        assert_eq!(query("two").page(), None);
        assert_eq!(PageQuery::default().page(), None);
    }

    #[test]
    fn missing_token_reads_as_empty() {
        assert_eq!(TokenQuery::default().token(), "");
        assert_eq!(PageQuery::default().token(), "");
    }

    #[test]
    fn session_response_serializes_flat() {
        let response = SessionResponse {
            key: "4821".to_string(),
            url: "http://localhost:5173/live/4821".to_string(),
            token: "T".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "4821",
                "url": "http://localhost:5173/live/4821",
                "token": "T"
            })
        );
    }

    #[test]
    fn server_faults_hide_their_details() {
        let body = ErrorResponse::from_live_error(&LiveError::Storage("disk on fire".into()));
        assert_eq!(body.code, "STORAGE_ERROR");
        assert!(!body.message.contains("disk"));
    }

    #[test]
    fn client_errors_keep_their_message() {
        let key = SessionKey::parse("4821").unwrap();
        let body = ErrorResponse::from_live_error(&LiveError::NotFound(key));
        assert_eq!(body.code, "SESSION_NOT_FOUND");
        assert!(body.message.contains("4821"));

        let body = ErrorResponse::from_live_error(&LiveError::validation("date", "bad"));
        assert_eq!(body.details, Some(serde_json::json!({ "field": "date" })));
    }
}
