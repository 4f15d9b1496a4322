//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, user identity, errors)
//! - `live` - Live session record, keys, tokens, events
//! - `deck` - Deck requests handed to the renderer

pub mod deck;
pub mod foundation;
pub mod live;
