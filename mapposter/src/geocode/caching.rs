//! Cache-first geocoder.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::{GeocodeError, Geocoder, GeocodingService};
use crate::cache::{self, CacheKey, CacheStore};
use crate::coord::Coordinates;
use crate::http::{with_retry, RateLimiter, RetryPolicy};

/// Geocoder consulting the cache before a rate-limited, retried lookup.
///
/// The cache is read before waiting on the rate limiter, so hits never
/// block behind earlier network requests.
pub struct CachingGeocoder {
    service: Arc<dyn GeocodingService>,
    cache: Arc<dyn CacheStore>,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
    ttl: Duration,
}

impl CachingGeocoder {
    pub fn new(
        service: Arc<dyn GeocodingService>,
        cache: Arc<dyn CacheStore>,
        rate_limiter: RateLimiter,
        retry: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            service,
            cache,
            rate_limiter,
            retry,
            ttl,
        }
    }

    fn lookup(&self, city: &str, country: &str) -> Result<Coordinates, GeocodeError> {
        let query = format!("{}, {}", city.trim(), country.trim());
        let hit = with_retry(
            &self.retry,
            "geocode",
            || {
                self.rate_limiter.acquire();
                self.service.search(&query)
            },
            GeocodeError::is_transient,
        )?;

        let hit = hit.ok_or_else(|| GeocodeError::NotFound {
            city: city.trim().to_string(),
            country: country.trim().to_string(),
        })?;

        if let Some(name) = &hit.display_name {
            info!(found = %name, "Geocoded place");
        }
        Ok(hit.coordinates)
    }
}

impl Geocoder for CachingGeocoder {
    fn geocode(&self, city: &str, country: &str) -> Result<Coordinates, GeocodeError> {
        if city.trim().is_empty() || country.trim().is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let key = CacheKey::geocode(city, country);
        if let Some(coords) = cache::load::<Coordinates>(self.cache.as_ref(), &key) {
            info!(city, country, coordinates = %coords, "Using cached coordinates");
            return Ok(coords);
        }

        info!(city, country, service = self.service.name(), "Looking up coordinates");
        let coords = self.lookup(city, country)?;
        info!(coordinates = %coords, "Coordinates resolved");

        if !cache::store(self.cache.as_ref(), &key, &coords, self.ttl) {
            debug!(key = %key, "Geocode result returned uncached");
        }
        Ok(coords)
    }
}
