//! LRU Eviction Module
//!
//! Selects and removes the least-recently-used entry. Recency order lives in
//! SQL, not in a separate tracker: smallest `last_accessed_at` first, ties
//! broken by key so eviction is deterministic.

use rusqlite::{params, OptionalExtension, Transaction};
use tracing::debug;

use crate::error::{CacheError, Result};

/// Weight of a single entry towards the capacity limit.
///
/// Every entry weighs 1: capacity bounds how many entries the store holds,
/// not how many bytes they take.
pub(crate) const ENTRY_WEIGHT: u64 = 1;

// == Evict One ==
/// Removes and returns the least-recently-used `(key, value)` pair.
///
/// Fails with [`CacheError::EmptyCache`] when the store holds no entries.
pub(crate) fn evict_one(txn: &Transaction<'_>) -> Result<(String, Vec<u8>)> {
    let (key, value) = peek_oldest(txn)?.ok_or(CacheError::EmptyCache)?;
    txn.execute("DELETE FROM cache WHERE key = ?1", params![&key])?;
    debug!(%key, "evicted least-recently-used entry");
    Ok((key, value))
}

// == Peek Oldest ==
/// Returns the least-recently-used `(key, value)` pair without removing it.
pub(crate) fn peek_oldest(txn: &Transaction<'_>) -> Result<Option<(String, Vec<u8>)>> {
    let row = txn
        .query_row(
            "SELECT key, value FROM cache ORDER BY last_accessed_at ASC, key ASC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(crate::cache::sqlite::SCHEMA).unwrap();
        conn
    }

    fn seed(txn: &Transaction<'_>, key: &str, accessed_at_ms: i64) {
        txn.execute(
            "INSERT INTO cache (key, value, created_at, last_accessed_at) \
             VALUES (?1, ?2, ?3, ?3)",
            params![key, format!("value-{key}").as_bytes(), accessed_at_ms],
        )
        .unwrap();
    }

    #[test]
    fn test_evict_one_picks_least_recently_used() {
        let mut conn = test_conn();
        let txn = conn.transaction().unwrap();
        seed(&txn, "newest", 30);
        seed(&txn, "oldest", 10);
        seed(&txn, "middle", 20);

        let (key, value) = evict_one(&txn).unwrap();
        assert_eq!(key, "oldest");
        assert_eq!(value, b"value-oldest");

        let (key, _) = evict_one(&txn).unwrap();
        assert_eq!(key, "middle");

        let (key, _) = evict_one(&txn).unwrap();
        assert_eq!(key, "newest");
    }

    #[test]
    fn test_evict_one_breaks_timestamp_ties_by_key() {
        let mut conn = test_conn();
        let txn = conn.transaction().unwrap();
        seed(&txn, "bravo", 10);
        seed(&txn, "alpha", 10);
        seed(&txn, "charlie", 10);

        let (key, _) = evict_one(&txn).unwrap();
        assert_eq!(key, "alpha");
        let (key, _) = evict_one(&txn).unwrap();
        assert_eq!(key, "bravo");
    }

    #[test]
    fn test_evict_one_on_empty_store() {
        let mut conn = test_conn();
        let txn = conn.transaction().unwrap();

        let err = evict_one(&txn).unwrap_err();
        assert!(matches!(err, CacheError::EmptyCache));
    }

    #[test]
    fn test_peek_oldest_does_not_remove() {
        let mut conn = test_conn();
        let txn = conn.transaction().unwrap();
        seed(&txn, "only", 5);

        let peeked = peek_oldest(&txn).unwrap().unwrap();
        assert_eq!(peeked.0, "only");

        // Still there after peeking.
        let count: i64 = txn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_peek_oldest_empty() {
        let mut conn = test_conn();
        let txn = conn.transaction().unwrap();
        assert!(peek_oldest(&txn).unwrap().is_none());
    }
}
