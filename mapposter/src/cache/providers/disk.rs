//! Disk-backed cache store.
//!
//! Each entry lives in its own file named after the SHA-256 of its key.
//! Files hold a bincode [`CacheEntry`] envelope carrying the full key, the
//! creation time and the TTL.
//!
//! # Concurrency
//!
//! Writes go to a uniquely named temp file in the same directory and are
//! renamed into place, so readers in this or any other process only ever see
//! a complete entry. Concurrent writers to one key race; the last rename wins.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::cache::traits::{CacheError, CacheStore, PurgeResult};

const ENTRY_EXTENSION: &str = "bin";
const TEMP_EXTENSION: &str = "tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache store persisting entries as files in a single directory.
///
/// The directory is created on the first write, not at construction.
pub struct DiskCache {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl DiskCache {
    /// Creates a store rooted at `dir` using the system clock.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    /// Creates a store with an explicit time source.
    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn temp_path_for(&self, key: &CacheKey) -> PathBuf {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{}.{}.{}.{}",
            key.file_name(),
            std::process::id(),
            seq,
            TEMP_EXTENSION
        ))
    }

    fn read_entry(&self, path: &Path) -> io::Result<Option<CacheEntry>> {
        let bytes = fs::read(path)?;
        Ok(CacheEntry::decode(&bytes))
    }

    fn entry_files(&self) -> io::Result<Vec<PathBuf>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

impl CacheStore for DiskCache {
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        let path = self.path_for(key);

        let entry = match self.read_entry(&path) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                warn!(path = %path.display(), "Corrupt cache entry, treating as miss");
                return None;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache entry, treating as miss");
                return None;
            }
        };

        if entry.key != key.as_str() {
            warn!(key = %key, stored = %entry.key, "Cache file key mismatch, treating as miss");
            return None;
        }

        if !entry.is_valid_at(self.clock.now()) {
            debug!(key = %key, "Cache entry expired");
            return None;
        }

        debug!(key = %key, bytes = entry.payload.len(), "Cache hit");
        Some(entry.payload)
    }

    fn put(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;

        let entry = CacheEntry::new(key.as_str(), payload, self.clock.now(), ttl);
        let bytes = entry
            .encode()
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let temp_path = self.temp_path_for(key);
        let write_result = fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = write_result.and_then(|_| fs::rename(&temp_path, self.path_for(key))) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!(key = %key, bytes = bytes.len(), ttl_secs = ttl.as_secs(), "Cache write");
        Ok(())
    }

    fn invalidate(&self, key: &CacheKey) -> Result<bool, CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut removed = 0usize;
        for path in self.entry_files()? {
            if has_extension(&path, ENTRY_EXTENSION) || has_extension(&path, TEMP_EXTENSION) {
                match fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        debug!(dir = %self.dir.display(), removed, "Cache cleared");
        Ok(())
    }

    fn purge_expired(&self) -> Result<PurgeResult, CacheError> {
        let now = self.clock.now();
        let mut result = PurgeResult::default();

        for path in self.entry_files()? {
            if !has_extension(&path, ENTRY_EXTENSION) {
                continue;
            }

            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            let keep = match self.read_entry(&path) {
                Ok(Some(entry)) => entry.is_valid_at(now),
                Ok(None) => false,
                Err(_) => continue,
            };

            if !keep && fs::remove_file(&path).is_ok() {
                result.entries_removed += 1;
                result.bytes_freed += size;
            }
        }

        debug!(
            entries = result.entries_removed,
            bytes = result.bytes_freed,
            "Purged expired cache entries"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "disk"
    }
}
