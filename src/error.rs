//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Backing store cannot be created, opened or read
    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Eviction requested on an empty cache
    #[error("Cache is empty")]
    EmptyCache,

    /// A single entry outweighs the whole cache
    #[error("Entry weight {weight} exceeds cache capacity {capacity}")]
    EntryTooLarge { weight: u64, capacity: u64 },
}

// == Error Conversions ==
impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
