//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that the live
//! session domain is built from.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{ErrorCode, ValidationError};
pub use ids::UserId;
pub use timestamp::Timestamp;
