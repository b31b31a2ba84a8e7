//! Cache Backend Trait Module
//!
//! The capability set a durable cache must provide, spelled out as a trait
//! so alternative backends satisfy an explicit contract instead of a
//! lookalike method set.

use crate::error::Result;

// == Cache Backend ==
/// Operations every durable key/value cache backend supports.
///
/// Implementations are safe to share across threads; all methods take
/// `&self`.
pub trait CacheBackend: Send + Sync {
    /// Retrieves the value stored under `key`, refreshing its recency.
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Stores `value` under `key`, evicting older entries as needed.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`, reporting whether an entry existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Checks for `key` without counting as a use.
    fn contains(&self, key: &str) -> Result<bool>;

    /// Number of live entries.
    fn len(&self) -> Result<usize>;

    /// True when no live entries remain.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of all live keys.
    fn keys(&self) -> Result<Vec<String>>;

    /// Deletes every entry.
    fn clear(&self) -> Result<()>;
}
