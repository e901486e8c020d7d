//! On-disk cache entry envelope.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bumped whenever the envelope layout changes; older files read as misses.
pub const ENTRY_FORMAT_VERSION: u32 = 1;

/// A cached payload together with its key and expiry metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub format_version: u32,
    /// Full key string; guards against hash collisions in file names.
    pub key: String,
    pub created_at_ms: i64,
    pub ttl_ms: u64,
    pub payload: Vec<u8>,
}

impl CacheEntry {
    pub fn new(key: &str, payload: Vec<u8>, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            format_version: ENTRY_FORMAT_VERSION,
            key: key.to_string(),
            created_at_ms: created_at.timestamp_millis(),
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            payload,
        }
    }

    /// An entry is valid while `now < created_at + ttl`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let ttl = i64::try_from(self.ttl_ms).unwrap_or(i64::MAX);
        let expires_at = self.created_at_ms.saturating_add(ttl);
        now.timestamp_millis() < expires_at
    }

    /// Serializes the envelope with bincode.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decodes an envelope, rejecting unknown format versions.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let entry: Self = bincode::deserialize(bytes).ok()?;
        (entry.format_version == ENTRY_FORMAT_VERSION).then_some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_before_expiry() {
        let created = Utc::now();
        let entry = CacheEntry::new("k", vec![1], created, Duration::from_secs(60));
        assert!(entry.is_valid_at(created));
        assert!(entry.is_valid_at(created + chrono::Duration::seconds(59)));
    }

    #[test]
    fn test_expired_at_boundary() {
        let created = Utc::now();
        let entry = CacheEntry::new("k", vec![1], created, Duration::from_secs(60));
        assert!(!entry.is_valid_at(created + chrono::Duration::seconds(60)));
        assert!(!entry.is_valid_at(created + chrono::Duration::days(1)));
    }

    #[test]
    fn test_zero_ttl_is_never_valid() {
        let created = Utc::now();
        let entry = CacheEntry::new("k", vec![], created, Duration::ZERO);
        assert!(!entry.is_valid_at(created));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let created = Utc::now();
        let entry = CacheEntry::new("k", vec![], created, Duration::MAX);
        assert!(entry.is_valid_at(created + chrono::Duration::days(365 * 100)));
    }

    #[test]
    fn test_decode_garbage_is_none() {
        assert!(CacheEntry::decode(b"not an entry").is_none());
        assert!(CacheEntry::decode(&[]).is_none());
    }

    #[test]
    fn test_decode_rejects_other_version() {
        let mut entry = CacheEntry::new("k", vec![7, 8], Utc::now(), Duration::from_secs(1));
        entry.format_version = ENTRY_FORMAT_VERSION + 1;
        let bytes = entry.encode().unwrap();
        assert!(CacheEntry::decode(&bytes).is_none());
    }

    #[test]
    fn test_encode_decode() {
        let entry = CacheEntry::new("geocode:x|y", vec![1, 2, 3], Utc::now(), Duration::from_secs(5));
        let decoded = CacheEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_eq!(decoded, entry);
    }
}
