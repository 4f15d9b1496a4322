//! HTTP adapter for live session endpoints.

mod dto;
mod handlers;
mod routes;
mod stream;

pub use dto::{ErrorResponse, PageQuery, SessionResponse, TokenQuery};
pub use handlers::{handle_live_error, health, LiveHandlers};
pub use routes::live_routes;
pub use stream::{Frame, PushStream, PushStreamConfig};
