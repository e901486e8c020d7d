//! Cache key derivation.
//!
//! Keys are derived only from the semantically relevant parts of a request.
//! Place names are normalized (trimmed, lowercased, inner whitespace
//! collapsed) and coordinates are rounded, so logically identical requests
//! always share an entry.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::coord::Coordinates;

/// Namespace for geocoding results.
pub const GEOCODE_NAMESPACE: &str = "geocode";
/// Namespace for street network graphs. Versioned with graph assembly so
/// graphs built by older releases read as misses.
pub const GRAPH_NAMESPACE: &str = "graph.v2";
/// Namespace for polygon feature layers.
pub const FEATURES_NAMESPACE: &str = "features";

/// Deterministic identifier for a cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a geocoding lookup of `(city, country)`.
    pub fn geocode(city: &str, country: &str) -> Self {
        Self(format!(
            "{}:{}|{}",
            GEOCODE_NAMESPACE,
            normalize(city),
            normalize(country)
        ))
    }

    /// Key for a street network around `center`.
    pub fn graph(center: &Coordinates, radius_m: u32) -> Self {
        Self(format!(
            "{}:{}|{}",
            GRAPH_NAMESPACE,
            center.cache_key_fragment(),
            radius_m
        ))
    }

    /// Key for a feature layer around `center` selected by a tag filter.
    ///
    /// `filter_identity` must already be order-independent (see
    /// `TagFilter::identity`).
    pub fn features(center: &Coordinates, radius_m: u32, filter_identity: &str) -> Self {
        Self(format!(
            "{}:{}|{}|{}",
            FEATURES_NAMESPACE,
            center.cache_key_fragment(),
            radius_m,
            filter_identity
        ))
    }

    /// The full key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name for this key in a disk store.
    ///
    /// The key is hashed so arbitrary place names are filesystem safe.
    pub fn file_name(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        format!("{:x}.bin", hasher.finalize())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a free-text name: trim, lowercase, collapse inner whitespace.
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
