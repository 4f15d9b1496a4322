//! Application router: live endpoints, artifacts, health, and the shared layers.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::application::LiveSessionService;
use crate::config::AppConfig;

use super::live::{health, live_routes, LiveHandlers};
use super::middleware::AuthState;

/// Builds the full HTTP surface.
///
/// `auth` is `None` when no identity provider is configured; presenters are
/// then always anonymous.
pub fn app_router(
    service: Arc<LiveSessionService>,
    auth: Option<AuthState>,
    config: &AppConfig,
) -> Router {
    let handlers = LiveHandlers::new(service, config.live.clone());

    Router::new()
        .route("/health", get(health))
        .merge(live_routes(handlers, auth, config.server.request_timeout()))
        .nest_service("/public", ServeDir::new(&config.storage.public_dir))
        .layer(cors_layer(&config.server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

/// Mirrors any origin unless an explicit list is configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
