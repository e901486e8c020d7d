//! Typed access on top of byte-oriented stores.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::key::CacheKey;
use super::traits::CacheStore;

/// Reads and decodes a cached value.
///
/// A payload that no longer decodes as `T` (for example after a type change)
/// is reported as a miss.
pub fn load<T: DeserializeOwned>(store: &dyn CacheStore, key: &CacheKey) -> Option<T> {
    let bytes = store.get(key)?;
    match bincode::deserialize(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "Cached payload did not decode, treating as miss");
            None
        }
    }
}

/// Encodes and writes a value, logging instead of failing.
///
/// Returns whether the write succeeded.
pub fn store<T: Serialize>(store: &dyn CacheStore, key: &CacheKey, value: &T, ttl: Duration) -> bool {
    let bytes = match bincode::serialize(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to encode value for cache");
            return false;
        }
    };

    match store.put(key, bytes, ttl) {
        Ok(()) => true,
        Err(e) => {
            warn!(key = %key, backend = store.name(), error = %e, "Cache write failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DiskCache, MemoryCache};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        values: Vec<u32>,
    }

    #[test]
    fn test_store_and_load() {
        let cache = MemoryCache::new();
        let key = CacheKey::geocode("a", "b");
        let sample = Sample {
            name: "x".into(),
            values: vec![1, 2, 3],
        };

        assert!(store(&cache, &key, &sample, Duration::from_secs(60)));
        assert_eq!(load::<Sample>(&cache, &key), Some(sample));
    }

    #[test]
    fn test_load_wrong_type_is_miss() {
        let cache = MemoryCache::new();
        let key = CacheKey::geocode("a", "b");
        cache.put(&key, vec![1], Duration::from_secs(60)).unwrap();
        assert!(load::<Sample>(&cache, &key).is_none());
    }

    #[test]
    fn test_store_failure_is_reported_not_raised() {
        let temp = tempfile::TempDir::new().unwrap();
        // A regular file where the directory should be makes every write fail
        let blocker = temp.path().join("blocked");
        std::fs::write(&blocker, b"file").unwrap();
        let cache = DiskCache::new(&blocker);

        let key = CacheKey::geocode("a", "b");
        assert!(!store(&cache, &key, &42u32, Duration::from_secs(60)));
        assert!(load::<u32>(&cache, &key).is_none());
    }
}
