//! Live module - presenter-driven sessions mirrored to followers.
//!
//! # Lifecycle
//!
//! ```text
//! Nonexistent ──create──▶ Active ──delete / idle cleanup──▶ Deleted
//!                          │  ▲
//!                          └──┘ update deck / change page
//! ```
//!
//! Every transition except idle cleanup requires the session token.

mod errors;
mod events;
mod key;
mod session;
mod token;

pub use errors::LiveError;
pub use events::LiveEvent;
pub use key::{SessionKey, KEY_LENGTH, KEY_SPACE};
pub use session::LiveSession;
pub use token::SessionToken;
