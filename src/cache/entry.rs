//! Cache Entry Module
//!
//! Row-level representation of a stored entry, plus the millisecond clock
//! every timestamp in the store is measured on.

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A single stored entry together with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Key the entry is stored under
    pub key: String,
    /// Opaque payload, returned byte-for-byte as written
    pub value: Vec<u8>,
    /// Insertion time (Unix milliseconds); an overwrite resets it
    pub created_at_ms: i64,
    /// Last successful read (Unix milliseconds); drives LRU order and TTL
    pub last_accessed_at_ms: i64,
}

impl Entry {
    // == Timestamp Accessors ==
    /// Insertion time as a UTC timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at_ms)
    }

    /// Last-access time as a UTC timestamp.
    pub fn last_accessed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_accessed_at_ms)
    }

    // == Age ==
    /// Milliseconds since the entry was last accessed, at the given clock
    /// reading.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.last_accessed_at_ms
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in milliseconds.
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
