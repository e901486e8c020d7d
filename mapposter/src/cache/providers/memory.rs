//! In-memory cache store using DashMap.
//!
//! Used for tests and for runs with caching disabled on disk. Expiry is
//! checked lazily on read and eagerly by `purge_expired`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::cache::traits::{CacheError, CacheStore, PurgeResult};

/// Process-local cache store.
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let entry = self.entries.get(key.as_str())?;
        if entry.is_valid_at(now) {
            Some(entry.payload.clone())
        } else {
            drop(entry);
            self.entries
                .remove_if(key.as_str(), |_, e| !e.is_valid_at(now));
            None
        }
    }

    fn put(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key.as_str(), payload, self.clock.now(), ttl);
        self.entries.insert(key.as_str().to_string(), entry);
        Ok(())
    }

    fn invalidate(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key.as_str()).is_some())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }

    fn purge_expired(&self) -> Result<PurgeResult, CacheError> {
        let now = self.clock.now();
        let mut result = PurgeResult::default();
        self.entries.retain(|_, entry| {
            let keep = entry.is_valid_at(now);
            if !keep {
                result.entries_removed += 1;
                result.bytes_freed += entry.payload.len() as u64;
            }
            keep
        });
        Ok(result)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
