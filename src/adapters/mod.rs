//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `live` - Session stores and event buses (in-memory, Redis)
//! - `storage` - Rendered artifact storage (local directory, in-memory)
//! - `render` - Deck renderers
//! - `auth` - Presenter identity (JWT, mock)
//! - `http` - axum router and push stream

pub mod auth;
pub mod http;
pub mod live;
pub mod render;
pub mod storage;
