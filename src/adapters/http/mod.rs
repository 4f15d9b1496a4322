//! HTTP adapters - REST and push-stream surface.
//!
//! - `live` - `/live` endpoints and the Server-Sent Events push stream
//! - `middleware` - optional bearer identity
//! - `app` - the assembled application router

mod app;
pub mod live;
pub mod middleware;

// Re-export key types for convenience
pub use app::app_router;
pub use live::{live_routes, LiveHandlers};
