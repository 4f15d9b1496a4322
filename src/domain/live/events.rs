//! Events fanned out to the followers of a live session.
//!
//! Events are transient: they are never persisted, and a follower that is
//! not attached when one is published simply misses it. The `start` event
//! doubles as the snapshot a follower receives on (re)attach.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A tagged event on a session's channel.
///
/// The serialized form is what travels over the distributed bus:
/// `{"type":"changePage","data":{"page":3}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum LiveEvent {
    /// A (new) deck is live: followers load `url` and jump to `current_page`.
    Start {
        url: String,
        #[serde(rename = "currentPage")]
        current_page: u32,
    },

    /// The presenter moved to another page of the current deck.
    ChangePage { page: u32 },

    /// The session has ended; followers should detach.
    Delete,

    /// Liveness marker emitted by stream adapters during idle periods.
    KeepAlive,
}

impl LiveEvent {
    /// Wire name of the event type.
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::Start { .. } => "start",
            LiveEvent::ChangePage { .. } => "changePage",
            LiveEvent::Delete => "delete",
            LiveEvent::KeepAlive => "keepAlive",
        }
    }

    /// Body of the event as presented to followers.
    pub fn body(&self) -> Value {
        match self {
            LiveEvent::Start { url, current_page } => {
                json!({ "url": url, "currentPage": current_page })
            }
            LiveEvent::ChangePage { page } => json!({ "page": page }),
            LiveEvent::Delete => json!({}),
            LiveEvent::KeepAlive => Value::Null,
        }
    }

    /// True for the event after which a session has no further events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LiveEvent::Delete)
    }
}
