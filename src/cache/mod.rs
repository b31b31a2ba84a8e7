//! Cache Module
//!
//! Provides durable key/value caching with TTL expiry and LRU eviction over
//! a file-backed SQLite store that independent processes can share.

mod entry;
mod lock;
mod lru;
mod sqlite;
mod stats;
mod store;
mod traits;


// Re-export public types
pub use entry::Entry;
pub use stats::CacheStats;
pub use store::{Cache, Items};
pub use traits::CacheBackend;
