//! Storage Adapters
//!
//! Implementations of the FileStore port for rendered deck artifacts.
//!
//! ## Available Adapters
//!
//! - **LocalFileStore** - Flat files under the public directory
//! - **InMemoryFileStore** - Stores files in memory (testing/development)

mod in_memory_file_store;
mod local_file_store;

pub use in_memory_file_store::InMemoryFileStore;
pub use local_file_store::LocalFileStore;
