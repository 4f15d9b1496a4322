//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the live-session core and the outside world. Adapters implement them.
//!
//! ## Session Ports
//!
//! - `LiveSessionStore` - Session records and atomic key allocation
//! - `LiveEventBus` - Per-session event fan-out (+ `Subscription` handle)
//!
//! ## Collaborator Ports
//!
//! - `DeckRenderer` - Renders a deck request into an artifact
//! - `FileStore` - Saves and releases public artifacts
//! - `SessionValidator` - Resolves bearer credentials into a user

mod deck_renderer;
mod file_store;
mod live_event_bus;
mod live_session_store;
mod session_validator;

pub use deck_renderer::{DeckRenderer, RenderError, RenderedDeck};
pub use file_store::{validate_file_name, FileStore, StorageError};
pub use live_event_bus::{BusError, LiveEventBus, Subscription};
pub use live_session_store::{ExpiredSession, LiveSessionStore, StoreError, MAX_KEY_ATTEMPTS};
pub use session_validator::SessionValidator;
