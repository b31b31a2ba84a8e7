//! Disk LRU - A durable, capacity-bounded, time-aware key/value cache
//!
//! Entries live in a transactional SQLite file that independent processes
//! share safely through an advisory lock. Capacity counts entries (every
//! entry weighs 1); when the store is full the least-recently-used entry is
//! evicted, and entries unused for longer than the configured TTL are swept
//! before every operation.
//!
//! ```no_run
//! use disklru::{Cache, CacheConfig};
//! use std::time::Duration;
//!
//! # fn main() -> disklru::Result<()> {
//! let cache = Cache::open(
//!     CacheConfig::new(1000)
//!         .location("/var/tmp/responses")
//!         .ttl(Duration::from_secs(300)),
//! )?;
//!
//! cache.set("greeting", b"hello")?;
//! let value = cache.get("greeting")?;
//! assert_eq!(value, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod policy;

pub use cache::{Cache, CacheBackend, CacheStats, Entry, Items};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use fingerprint::CallFingerprint;
pub use policy::CachePolicy;
