//! Cache Store Module
//!
//! The cache facade: a durable key/value mapping with LRU eviction and TTL
//! expiry, safe to share between threads and between processes.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, OptionalExtension, Transaction};
use tracing::{debug, info};

use crate::cache::entry::{now_ms, Entry};
use crate::cache::lru::{self, ENTRY_WEIGHT};
use crate::cache::sqlite::Store;
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Cache ==
/// Durable key/value cache with LRU eviction and TTL expiry.
///
/// Every operation is one critical section against the shared store: acquire
/// the store lock, sweep expired entries, do the work, commit, release. The
/// lock spans process boundaries, so even the compound
/// evict-until-capacity-then-insert step of [`Cache::set`] is atomic with
/// respect to every other handle on the same location.
#[derive(Debug)]
pub struct Cache {
    store: Store,
    capacity: u64,
    ttl: Option<Duration>,
    stats: StatsRecorder,
}

impl Cache {
    // == Open ==
    /// Opens (or creates) the cache described by `config`.
    ///
    /// The backing file and its directory are created lazily on first use.
    /// With `clear_on_start` set, any pre-existing store at the location is
    /// destroyed first. Fails with [`CacheError::InvalidConfiguration`] for
    /// a zero capacity or an empty location.
    pub fn open(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let store = Store::new(&config.location, config.db_path());

        if config.clear_on_start {
            info!(location = %config.location.display(), "clearing cache store on start");
            store.wipe()?;
        }

        let cache = Self {
            store,
            capacity: config.capacity,
            ttl: config.ttl,
            stats: StatsRecorder::default(),
        };

        // With a TTL configured, sweep what accumulated while no process was
        // running; without one there is nothing to expire and the store stays
        // untouched until the first operation.
        if cache.ttl.is_some() {
            cache.store.with_txn(|txn| {
                cache.sweep(txn)?;
                Ok(())
            })?;
        }

        Ok(cache)
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// A successful read refreshes the entry's last-access time, making it
    /// the most recently used. Fails with [`CacheError::NotFound`] when the
    /// key is absent or its TTL has elapsed.
    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.get_entry(key).map(|entry| entry.value)
    }

    // == Get Entry ==
    /// Like [`Cache::get`], but returns the entry together with its
    /// timestamps. `last_accessed_at` reflects this read.
    pub fn get_entry(&self, key: &str) -> Result<Entry> {
        let found = self.store.with_txn(|txn| {
            self.sweep(txn)?;
            let row: Option<(Vec<u8>, i64)> = txn
                .query_row(
                    "SELECT value, created_at FROM cache WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            match row {
                Some((value, created_at_ms)) => {
                    let now = now_ms();
                    txn.execute(
                        "UPDATE cache SET last_accessed_at = ?1 WHERE key = ?2",
                        params![now, key],
                    )?;
                    Ok(Some((value, created_at_ms, now)))
                }
                None => Ok(None),
            }
        })?;

        match found {
            Some((value, created_at_ms, last_accessed_at_ms)) => {
                self.stats.record_hit();
                Ok(Entry {
                    key: key.to_string(),
                    value,
                    created_at_ms,
                    last_accessed_at_ms,
                })
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, overwriting any previous entry.
    ///
    /// Capacity counts entries, not bytes: every entry weighs 1 against
    /// `capacity` regardless of payload size. While admitting the new entry
    /// would leave the store over capacity, the least-recently-used entry is
    /// evicted first. The write sets both `created_at` and
    /// `last_accessed_at` to now; an overwrite resets both.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let weight = ENTRY_WEIGHT;
        if weight > self.capacity {
            return Err(CacheError::EntryTooLarge {
                weight,
                capacity: self.capacity,
            });
        }

        let evicted = self.store.with_txn(|txn| {
            self.sweep(txn)?;

            let mut evicted = 0u64;
            while self.live_count(txn)? + weight > self.capacity {
                lru::evict_one(txn)?;
                evicted += 1;
            }

            txn.execute(
                "INSERT OR REPLACE INTO cache (key, value, created_at, last_accessed_at) \
                 VALUES (?1, ?2, ?3, ?3)",
                params![key, value, now_ms()],
            )?;
            Ok(evicted)
        })?;

        if evicted > 0 {
            self.stats.record_evictions(evicted);
        }
        Ok(())
    }

    // == Delete ==
    /// Removes the entry stored under `key`.
    ///
    /// Returns `Ok(true)` when an entry existed; deleting an absent key is
    /// not an error.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.store.with_txn(|txn| {
            self.sweep(txn)?;
            let deleted = txn.execute("DELETE FROM cache WHERE key = ?1", params![key])?;
            Ok(deleted > 0)
        })
    }

    // == Contains ==
    /// Checks whether `key` is present, without counting as a use.
    ///
    /// The probe leaves `last_accessed_at` alone, so it never changes
    /// eviction order.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.store.with_txn(|txn| {
            self.sweep(txn)?;
            let found = txn
                .query_row("SELECT 1 FROM cache WHERE key = ?1", params![key], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    // == Length ==
    /// Number of live entries, after sweeping expired ones.
    pub fn len(&self) -> Result<usize> {
        self.store.with_txn(|txn| {
            self.sweep(txn)?;
            Ok(self.live_count(txn)? as usize)
        })
    }

    // == Is Empty ==
    /// True when the store holds no live entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // == Keys ==
    /// All live keys, snapshotted at the moment of the call and sorted.
    ///
    /// The snapshot is finite and consistent; a writer in another process
    /// may mutate the store before the caller finishes with it.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.store.with_txn(|txn| {
            self.sweep(txn)?;
            let mut stmt = txn.prepare("SELECT key FROM cache ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
    }

    // == Items ==
    /// Lazy `(key, value)` iteration: one read per snapshotted key.
    ///
    /// Each yielded read refreshes its entry's recency, like [`Cache::get`].
    /// Keys that vanish between the snapshot and their read (deleted, swept
    /// or evicted by a concurrent writer) are silently skipped; store
    /// failures are still surfaced.
    pub fn items(&self) -> Result<Items<'_>> {
        Ok(Items {
            cache: self,
            keys: self.keys()?.into_iter(),
        })
    }

    // == Pop LRU ==
    /// Removes and returns the least-recently-used `(key, value)` pair.
    ///
    /// This is the eviction primitive behind [`Cache::set`], exposed for
    /// callers that manage space themselves. It does not sweep, so an
    /// expired entry can still be popped. Fails with
    /// [`CacheError::EmptyCache`] when the store is empty.
    pub fn pop_lru(&self) -> Result<(String, Vec<u8>)> {
        let popped = self.store.with_txn(lru::evict_one)?;
        self.stats.record_evictions(1);
        Ok(popped)
    }

    // == Clear ==
    /// Deletes every entry in the store.
    pub fn clear(&self) -> Result<()> {
        self.store.with_txn(|txn| {
            txn.execute("DELETE FROM cache", [])?;
            Ok(())
        })
    }

    // == Stats ==
    /// Counter snapshot plus the current live-entry count.
    ///
    /// Counters are local to this handle; other processes sharing the store
    /// keep their own.
    pub fn stats(&self) -> Result<CacheStats> {
        let total_entries = self.len()? as u64;
        Ok(self.stats.snapshot(total_entries))
    }

    // == Accessors ==
    /// Configured capacity, in entries.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Configured time-to-live, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &Path {
        self.store.db_path()
    }

    // == Sweep ==
    /// Deletes every entry whose age since last access exceeds the TTL.
    ///
    /// First step of every operation that looks at the store, and a no-op
    /// without a configured TTL. An entry expires only when its age is
    /// strictly greater than the TTL. Runs inside the caller's critical
    /// section, never as a separate lock acquisition.
    fn sweep(&self, txn: &Transaction<'_>) -> Result<usize> {
        let Some(ttl) = self.ttl else {
            return Ok(0);
        };
        // A TTL wider than the clock saturates instead of wrapping negative.
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        let removed = txn.execute(
            "DELETE FROM cache WHERE ?1 - last_accessed_at > ?2",
            params![now_ms(), ttl_ms],
        )?;
        if removed > 0 {
            debug!(removed, "swept expired entries");
            self.stats.record_expirations(removed as u64);
        }
        Ok(removed)
    }

    /// Live entries currently in the store.
    fn live_count(&self, txn: &Transaction<'_>) -> Result<u64> {
        let count: i64 = txn.query_row("SELECT COUNT(key) FROM cache", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

// == Cache Backend Implementation ==
impl crate::cache::traits::CacheBackend for Cache {
    fn get(&self, key: &str) -> Result<Vec<u8>> {
        Cache::get(self, key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        Cache::set(self, key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Cache::delete(self, key)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Cache::contains(self, key)
    }

    fn len(&self) -> Result<usize> {
        Cache::len(self)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Cache::keys(self)
    }

    fn clear(&self) -> Result<()> {
        Cache::clear(self)
    }
}

// == Items Iterator ==
/// Iterator returned by [`Cache::items`].
pub struct Items<'a> {
    cache: &'a Cache,
    keys: std::vec::IntoIter<String>,
}

impl Iterator for Items<'_> {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.keys.next()?;
            match self.cache.get(&key) {
                Ok(value) => return Some(Ok((key, value))),
                Err(CacheError::NotFound(_)) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
