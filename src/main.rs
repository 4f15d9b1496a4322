//! Live Deck server binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;

use live_deck::adapters::auth::JwtSessionValidator;
use live_deck::adapters::http::{app_router, middleware::AuthState};
use live_deck::adapters::live::{
    InMemoryEventBus, InMemoryLiveSessionStore, RedisEventBus, RedisLiveSessionStore,
};
use live_deck::adapters::render::JsonDeckRenderer;
use live_deck::adapters::storage::LocalFileStore;
use live_deck::application::{CleanupScheduler, LiveSessionService};
use live_deck::config::{AppConfig, RedisConfig};
use live_deck::ports::{FileStore, LiveEventBus, LiveSessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    init_tracing(&config);

    let (store, bus) = match &config.redis {
        Some(redis) => redis_backends(redis, config.live.subscriber_capacity).await?,
        None => {
            tracing::info!("No Redis configured, using in-memory live session backends");
            let store: Arc<dyn LiveSessionStore> = Arc::new(InMemoryLiveSessionStore::new());
            let bus: Arc<dyn LiveEventBus> =
                Arc::new(InMemoryEventBus::new(config.live.subscriber_capacity));
            (store, bus)
        }
    };

    tokio::fs::create_dir_all(&config.storage.public_dir)
        .await
        .with_context(|| format!("failed to create {}", config.storage.public_dir.display()))?;
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(
        config.storage.public_dir.clone(),
        config.storage.public_url.clone(),
    ));
    let renderer = Arc::new(JsonDeckRenderer::new(files.clone()));

    let auth: Option<AuthState> = match &config.auth.jwt_key {
        Some(key) => Some(Arc::new(
            JwtSessionValidator::from_hex_key(key).context("invalid JWT key")?,
        )),
        None => None,
    };

    let service = Arc::new(LiveSessionService::new(
        store,
        bus,
        renderer,
        files,
        config.live.max_idle(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = CleanupScheduler::new(service.clone(), config.live.cleanup_interval());
    let cleanup = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    let app = app_router(service, auth, &config);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("live-deck listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = cleanup.await {
        tracing::warn!(error = %e, "Cleanup scheduler ended abnormally");
    }
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.log_level.clone().into());

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn redis_backends(
    config: &RedisConfig,
    subscriber_capacity: usize,
) -> Result<(Arc<dyn LiveSessionStore>, Arc<dyn LiveEventBus>)> {
    let client = redis::Client::open(config.url.as_str()).context("invalid Redis URL")?;
    let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
        .await
        .context("timed out connecting to Redis")?
        .context("failed to connect to Redis")?;

    tracing::info!("Using Redis live session backends");
    let store: Arc<dyn LiveSessionStore> = Arc::new(RedisLiveSessionStore::new(conn.clone()));
    let bus: Arc<dyn LiveEventBus> =
        Arc::new(RedisEventBus::new(client, conn, subscriber_capacity));
    Ok((store, bus))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
