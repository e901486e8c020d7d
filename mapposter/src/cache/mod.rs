//! Persistent cache for geocoding results and OSM payloads.
//!
//! Every network-backed component looks in the cache before touching the
//! network and writes its result back afterwards. The cache is never a
//! correctness dependency: unreadable or corrupt entries are misses and
//! failed writes are logged, not propagated.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use mapposter::cache::{self, CacheKey, MemoryCache};
//!
//! let store = MemoryCache::new();
//! let key = CacheKey::geocode("Paris", "France");
//!
//! cache::store(&store, &key, &(48.8566f64, 2.3522f64), Duration::from_secs(60));
//! let hit: Option<(f64, f64)> = cache::load(&store, &key);
//! assert_eq!(hit, Some((48.8566, 2.3522)));
//! ```

mod clock;
mod entry;
mod key;
mod providers;
mod traits;
mod typed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, ENTRY_FORMAT_VERSION};
pub use key::{normalize, CacheKey, FEATURES_NAMESPACE, GEOCODE_NAMESPACE, GRAPH_NAMESPACE};
pub use providers::{DiskCache, MemoryCache};
pub use traits::{CacheError, CacheStore, PurgeResult};
pub use typed::{load, store};
