//! Deck renderer adapters.
//!
//! - `JsonDeckRenderer` - Paged JSON documents for the follower front end
//! - `MockDeckRenderer` - Predictable artifacts and failure injection for tests

mod json_renderer;
mod mock;

pub use json_renderer::JsonDeckRenderer;
pub use mock::MockDeckRenderer;
