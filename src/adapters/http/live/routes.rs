//! HTTP routes for live session endpoints.

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{
    change_page, create_session, delete_session, put_session, stream_session, LiveHandlers,
};

/// Creates the live session router.
///
/// Every route except the push stream is bounded by `request_timeout`.
/// Bearer identity is only read where a deck is rendered.
pub fn live_routes(
    handlers: LiveHandlers,
    auth: Option<AuthState>,
    request_timeout: Duration,
) -> Router {
    let timeout = TimeoutLayer::new(request_timeout);

    Router::new()
        .route(
            "/live",
            with_identity(post(create_session), &auth).layer(timeout.clone()),
        )
        .route(
            "/live/:key",
            get(stream_session).merge(
                with_identity(put(put_session), &auth)
                    .delete(delete_session)
                    .layer(timeout.clone()),
            ),
        )
        .route("/live/:key/page", post(change_page).layer(timeout))
        .with_state(handlers)
}

fn with_identity(
    route: MethodRouter<LiveHandlers>,
    auth: &Option<AuthState>,
) -> MethodRouter<LiveHandlers> {
    match auth {
        Some(validator) => route.layer(middleware::from_fn_with_state(
            validator.clone(),
            auth_middleware,
        )),
        None => route,
    }
}
