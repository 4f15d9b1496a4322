//! Live session adapters.
//!
//! In-memory implementations serve tests and single-instance deployments;
//! the Redis ones let several instances share sessions and events.

mod in_memory_bus;
mod in_memory_store;
mod redis_bus;
mod redis_store;

pub use in_memory_bus::{InMemoryEventBus, DEFAULT_SUBSCRIBER_CAPACITY};
pub use in_memory_store::InMemoryLiveSessionStore;
pub use redis_bus::{RedisEventBus, CHANNEL_PREFIX};
pub use redis_store::{RedisLiveSessionStore, DATA_KEY_PREFIX};
