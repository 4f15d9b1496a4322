//! HTTP middleware for axum.
//!
//! - `auth` - Optional bearer identity middleware and extractor

pub mod auth;

pub use auth::{auth_middleware, AuthState, OptionalAuth};
