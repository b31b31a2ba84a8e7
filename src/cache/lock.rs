//! Store Lock Module
//!
//! Cross-process mutual exclusion for the backing store. Every cache
//! operation runs inside a single acquisition of this lock, so operations
//! never interleave their store access even when they come from different
//! processes sharing the same cache location.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{trace, warn};

use crate::error::Result;

/// File name of the advisory lock next to the database file.
pub(crate) const LOCK_FILE_NAME: &str = "disklru.lock";

// == Store Lock ==
/// Advisory file lock bound to a cache location.
///
/// Not re-entrant: one acquisition wraps one whole cache operation, never
/// more. Acquiring twice from the same thread deadlocks.
#[derive(Debug)]
pub(crate) struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    /// Creates a lock handle for the given cache location.
    pub(crate) fn new(location: &Path) -> Self {
        Self {
            path: location.join(LOCK_FILE_NAME),
        }
    }

    /// Blocks until this process holds the store exclusively.
    ///
    /// Creates the cache location (and the lock file) on first use. There is
    /// no timeout: a caller waits as long as another holder needs.
    pub(crate) fn acquire(&self) -> Result<StoreGuard> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?;
        file.lock_exclusive()?;
        trace!(lock = %self.path.display(), "store lock acquired");

        Ok(StoreGuard {
            file,
            path: self.path.clone(),
        })
    }
}

// == Store Guard ==
/// Holds the exclusive lock; released on drop.
#[derive(Debug)]
pub(crate) struct StoreGuard {
    file: File,
    path: PathBuf,
}

impl Drop for StoreGuard {
    fn drop(&mut self) {
        // The OS drops the lock with the descriptor anyway; the explicit
        // unlock just makes the release immediate.
        if let Err(err) = self.file.unlock() {
            warn!(lock = %self.path.display(), %err, "failed to release store lock");
        }
        trace!(lock = %self.path.display(), "store lock released");
    }
}
