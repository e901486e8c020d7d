//! Core traits for the cache store.
//!
//! The `CacheStore` trait provides a content-keyed interface for persisting
//! expensive lookups (geocoding results, OSM payloads). Payloads are opaque
//! bytes; typed access lives in [`super::typed`].
//!
//! # Failure Semantics
//!
//! The cache is an optimization, never a correctness dependency:
//!
//! - `get` never fails. Missing, expired, unreadable and corrupt entries all
//!   read as `None`.
//! - `put` reports failures so callers can log them, but callers must still
//!   return their computed value.
//!
//! # Thread Safety
//!
//! All implementations must be `Send + Sync`. A single store is shared by
//! every component (and possibly several processes, for the disk store)
//! without external locking. Writes are atomic per key; last writer wins.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::key::CacheKey;

/// Errors that can occur while writing to or maintaining a cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error during cache operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result of purging expired entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeResult {
    /// Number of entries removed.
    pub entries_removed: usize,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl fmt::Display for PurgeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Purge: removed {} entries, freed {} bytes",
            self.entries_removed, self.bytes_freed
        )
    }
}

/// Persistent key-value store with per-entry time-to-live.
pub trait CacheStore: Send + Sync {
    /// Retrieve a payload by key.
    ///
    /// Returns `None` when the key is missing, the entry has expired, or the
    /// underlying storage cannot be read.
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>>;

    /// Store a payload with the given time-to-live.
    ///
    /// Any existing entry for the key is replaced.
    fn put(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a single entry.
    ///
    /// Returns `Ok(true)` if an entry existed.
    fn invalidate(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// Remove every entry.
    fn clear(&self) -> Result<(), CacheError>;

    /// Remove expired entries.
    fn purge_expired(&self) -> Result<PurgeResult, CacheError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}
