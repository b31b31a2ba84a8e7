//! SQLite Store Module
//!
//! Owns the on-disk table behind the cache: connection lifecycle, schema
//! creation and the per-operation transaction scope.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::cache::lock::StoreLock;
use crate::error::Result;

/// Idempotent schema for the single cache table.
///
/// Timestamps are Unix milliseconds so TTL comparisons keep sub-second
/// precision; the index serves the LRU ordering scans.
pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cache (
    key              TEXT PRIMARY KEY,
    value            BLOB NOT NULL,
    created_at       INTEGER NOT NULL,
    last_accessed_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cache_last_accessed ON cache (last_accessed_at);
";

// == Store ==
/// Handle to the durable, file-backed store shared by every process using
/// the same cache location.
///
/// A `Store` holds no open connection. Each operation acquires the store
/// lock, opens a fresh connection, ensures the schema, runs inside one
/// transaction and closes again, so the file is free for other processes
/// between any two operations.
#[derive(Debug)]
pub(crate) struct Store {
    db_path: PathBuf,
    lock: StoreLock,
}

impl Store {
    /// Creates a store handle rooted at the given location directory.
    ///
    /// Nothing is touched on disk until the first operation runs.
    pub(crate) fn new(location: &Path, db_path: PathBuf) -> Self {
        Self {
            db_path,
            lock: StoreLock::new(location),
        }
    }

    /// Runs one cache operation against the store.
    ///
    /// The whole call is a single critical section: the store lock is held
    /// from before the connection opens until after the transaction commits,
    /// so a sweep and the work that follows it can never interleave with
    /// another process. An error from `op` rolls the transaction back.
    pub(crate) fn with_txn<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.lock.acquire()?;
        let mut conn = Connection::open(&self.db_path)?;
        conn.execute_batch(SCHEMA)?;

        let txn = conn.transaction()?;
        let out = op(&txn)?;
        txn.commit()?;
        Ok(out)
    }

    /// Destroys the backing database file (and its SQLite siblings), if any.
    ///
    /// Runs under the store lock; absence of the files is not an error.
    pub(crate) fn wipe(&self) -> Result<()> {
        let _guard = self.lock.acquire()?;
        for path in [
            self.db_path.clone(),
            sibling(&self.db_path, "-journal"),
            sibling(&self.db_path, "-wal"),
            sibling(&self.db_path, "-shm"),
        ] {
            match fs::remove_file(&path) {
                Ok(()) => debug!(file = %path.display(), "removed backing store file"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    pub(crate) fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Appends a suffix to a database path (`cache.db` -> `cache.db-wal`).
fn sibling(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> Store {
        Store::new(dir.path(), dir.path().join("test.db"))
    }

    #[test]
    fn test_with_txn_creates_store_on_first_use() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        assert!(!store.db_path().exists());
        let count: i64 = store
            .with_txn(|txn| {
                Ok(txn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?)
            })
            .unwrap();

        assert_eq!(count, 0);
        assert!(store.db_path().is_file());
    }

    #[test]
    fn test_with_txn_commits_writes() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        store
            .with_txn(|txn| {
                txn.execute(
                    "INSERT INTO cache (key, value, created_at, last_accessed_at) \
                     VALUES ('k', X'00', 1, 1)",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        let count: i64 = store
            .with_txn(|txn| {
                Ok(txn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_with_txn_rolls_back_on_error() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let result: Result<()> = store.with_txn(|txn| {
            txn.execute(
                "INSERT INTO cache (key, value, created_at, last_accessed_at) \
                 VALUES ('k', X'00', 1, 1)",
                [],
            )?;
            Err(crate::error::CacheError::EmptyCache)
        });
        assert!(result.is_err());

        let count: i64 = store
            .with_txn(|txn| {
                Ok(txn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_wipe_removes_store_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        // Wiping before anything exists must succeed.
        store.wipe().unwrap();

        store.with_txn(|_| Ok(())).unwrap();
        assert!(store.db_path().exists());

        store.wipe().unwrap();
        assert!(!store.db_path().exists());
    }

    #[test]
    fn test_wipe_removes_stray_journal() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        store.with_txn(|_| Ok(())).unwrap();
        // A crash between journal creation and commit leaves this behind.
        let journal = dir.path().join("test.db-journal");
        std::fs::write(&journal, b"interrupted rollback journal").unwrap();

        store.wipe().unwrap();
        assert!(!store.db_path().exists());
        assert!(!journal.exists());
    }

    #[test]
    fn test_corrupt_store_surfaces_error() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        let mut file = std::fs::File::create(store.db_path()).unwrap();
        file.write_all(b"this is not a sqlite database at all").unwrap();
        drop(file);

        let result = store.with_txn(|_| Ok(()));
        assert!(matches!(
            result,
            Err(crate::error::CacheError::StoreUnavailable(_))
        ));
    }
}
