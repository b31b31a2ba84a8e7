//! Configuration Module
//!
//! Holds the tunables for a cache instance and validates them before the
//! store is touched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default directory for the backing store, relative to the working directory.
pub const DEFAULT_LOCATION: &str = ".cache";

/// File name of the SQLite database inside the cache location.
pub const DB_FILE_NAME: &str = "disklru.db";

/// Cache configuration parameters.
///
/// Only the capacity is required; everything else has a default.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of live entries (capacity counts entries, not bytes)
    pub capacity: u64,
    /// Directory holding the backing store; created on first use
    pub location: PathBuf,
    /// Time-to-live measured since last access; `None` means never expire
    pub ttl: Option<Duration>,
    /// Destroy any pre-existing backing store before first use
    pub clear_on_start: bool,
}

impl CacheConfig {
    /// Creates a configuration with the given capacity and defaults for
    /// everything else.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            location: PathBuf::from(DEFAULT_LOCATION),
            ttl: None,
            clear_on_start: false,
        }
    }

    /// Sets the directory the backing store lives in.
    pub fn location(mut self, location: impl AsRef<Path>) -> Self {
        self.location = location.as_ref().to_path_buf();
        self
    }

    /// Sets the time-to-live applied to every entry.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Requests that any pre-existing store be destroyed when the cache
    /// opens.
    pub fn clear_on_start(mut self, clear: bool) -> Self {
        self.clear_on_start = clear;
        self
    }

    /// Path of the SQLite database file inside the location directory.
    pub fn db_path(&self) -> PathBuf {
        self.location.join(DB_FILE_NAME)
    }

    /// Validates the configuration.
    ///
    /// A capacity of zero could never admit an entry and an empty location
    /// has nowhere to put the store, so both are rejected up front.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be a positive entry count".to_string(),
            ));
        }
        if self.location.as_os_str().is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "location must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CacheConfig::new(64);
        assert_eq!(config.capacity, 64);
        assert_eq!(config.location, PathBuf::from(DEFAULT_LOCATION));
        assert_eq!(config.ttl, None);
        assert!(!config.clear_on_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_chain() {
        let config = CacheConfig::new(8)
            .location("/tmp/some-cache")
            .ttl(Duration::from_secs(30))
            .clear_on_start(true);

        assert_eq!(config.capacity, 8);
        assert_eq!(config.location, PathBuf::from("/tmp/some-cache"));
        assert_eq!(config.ttl, Some(Duration::from_secs(30)));
        assert!(config.clear_on_start);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/some-cache").join(DB_FILE_NAME));
    }

    #[test]
    fn test_config_rejects_zero_capacity() {
        let err = CacheConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_config_rejects_empty_location() {
        let err = CacheConfig::new(4).location("").validate().unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfiguration(_)));
    }
}
