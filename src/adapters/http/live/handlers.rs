//! HTTP handlers for live session endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::OptionalAuth;
use crate::application::{LiveSessionService, SessionHandle};
use crate::config::LiveConfig;
use crate::domain::deck::LiveSessionRequest;
use crate::domain::live::{LiveError, SessionKey};

use super::dto::{ErrorResponse, PageQuery, SessionResponse, TokenQuery};
use super::stream::{PushStream, PushStreamConfig};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct LiveHandlers {
    service: Arc<LiveSessionService>,
    live: Arc<LiveConfig>,
}

impl LiveHandlers {
    pub fn new(service: Arc<LiveSessionService>, live: LiveConfig) -> Self {
        Self {
            service,
            live: Arc::new(live),
        }
    }

    fn stream_config(&self) -> PushStreamConfig {
        PushStreamConfig {
            keep_alive: self.live.keep_alive(),
            retry: self.live.retry(),
        }
    }

    fn session_response(&self, handle: &SessionHandle) -> SessionResponse {
        SessionResponse {
            key: handle.key.to_string(),
            url: self.live.follower_url(handle.key.as_str()),
            token: handle.token.expose().to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /live - Start a session under a fresh key
pub async fn create_session(
    State(handlers): State<LiveHandlers>,
    OptionalAuth(user): OptionalAuth,
    body: Result<Json<LiveSessionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };

    match handlers.service.create_session(&req, user.as_ref()).await {
        Ok(handle) => (
            StatusCode::CREATED,
            Json(handlers.session_response(&handle)),
        )
            .into_response(),
        Err(e) => handle_live_error(e),
    }
}

/// PUT /live/:key?token= - Create under a chosen key, or update
pub async fn put_session(
    State(handlers): State<LiveHandlers>,
    OptionalAuth(user): OptionalAuth,
    Path(key): Path<String>,
    Query(query): Query<TokenQuery>,
    body: Result<Json<LiveSessionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return handle_body_rejection(rejection),
    };

    match handlers
        .service
        .put_session(&key, &req, query.token(), user.as_ref())
        .await
    {
        Ok(outcome) => {
            let status = if outcome.is_created() {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(handlers.session_response(outcome.handle()))).into_response()
        }
        Err(e) => handle_live_error(e),
    }
}

/// GET /live/:key - Follow a session as Server-Sent Events
pub async fn stream_session(
    State(handlers): State<LiveHandlers>,
    Path(key): Path<String>,
) -> Response {
    let Some(key) = parse_existing_key(&key) else {
        return not_found(&key);
    };

    match handlers.service.subscribe(&key).await {
        Ok(attached) => PushStream::new(attached, handlers.stream_config())
            .into_sse()
            .into_response(),
        Err(e) => handle_live_error(e),
    }
}

/// DELETE /live/:key?token= - End a session
pub async fn delete_session(
    State(handlers): State<LiveHandlers>,
    Path(key): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(key) = parse_existing_key(&key) else {
        return not_found(&key);
    };

    match handlers.service.delete_session(&key, query.token()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_live_error(e),
    }
}

/// POST /live/:key/page?token=&page= - Move followers to a page
pub async fn change_page(
    State(handlers): State<LiveHandlers>,
    Path(key): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let Some(key) = parse_existing_key(&key) else {
        return not_found(&key);
    };
    let Some(page) = query.page() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(
                "page must be a non-negative integer",
            )),
        )
            .into_response();
    };

    match handlers.service.change_page(&key, page, query.token()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_live_error(e),
    }
}

/// GET /health - Liveness check
pub async fn health() -> &'static str {
    "ok"
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

/// A malformed key can never name a live session.
fn parse_existing_key(raw: &str) -> Option<SessionKey> {
    SessionKey::parse(raw).ok()
}

fn not_found(raw: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found(raw))).into_response()
}

fn handle_body_rejection(rejection: JsonRejection) -> Response {
    (
        rejection.status(),
        Json(ErrorResponse::bad_request(rejection.body_text())),
    )
        .into_response()
}

/// Maps domain errors to HTTP responses.
pub fn handle_live_error(error: LiveError) -> Response {
    let status = match &error {
        LiveError::NotFound(_) => StatusCode::NOT_FOUND,
        LiveError::MissingToken => StatusCode::UNAUTHORIZED,
        LiveError::InvalidToken => StatusCode::FORBIDDEN,
        LiveError::InvalidKey(_) | LiveError::Validation { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LiveError::Capacity
        | LiveError::Render(_)
        | LiveError::Storage(_)
        | LiveError::Infrastructure(_) => {
            tracing::error!(error = %error, "Live session request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::from_live_error(&error))).into_response()
}
