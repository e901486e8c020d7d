//! Cache-first data fetcher.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::types::{FeatureLayer, StreetGraph, TagFilter};
use super::{validate_radius, DataFetcher, FetchError, GeoDataSource, SourceError, STREETS_LAYER};
use crate::cache::{self, CacheKey, CacheStore};
use crate::coord::{bounding_box, Coordinates};
use crate::http::{with_retry, RateLimiter, RetryPolicy};

/// Data fetcher consulting the cache before a rate-limited, retried source.
///
/// Graph and feature requests have separate rate limiters so the three
/// concurrent fetches of one poster pace independently per request kind.
/// Empty feature layers are cached (a region without parks stays without
/// parks); empty street graphs are not.
pub struct CachingDataFetcher {
    source: Arc<dyn GeoDataSource>,
    cache: Arc<dyn CacheStore>,
    graph_limiter: RateLimiter,
    features_limiter: RateLimiter,
    retry: RetryPolicy,
    ttl: Duration,
}

impl CachingDataFetcher {
    pub fn new(
        source: Arc<dyn GeoDataSource>,
        cache: Arc<dyn CacheStore>,
        graph_limiter: RateLimiter,
        features_limiter: RateLimiter,
        retry: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            graph_limiter,
            features_limiter,
            retry,
            ttl,
        }
    }

    fn request<T>(
        &self,
        layer: &str,
        limiter: &RateLimiter,
        op: impl Fn() -> Result<T, SourceError>,
    ) -> Result<T, FetchError> {
        with_retry(
            &self.retry,
            layer,
            || {
                limiter.acquire();
                op()
            },
            SourceError::is_transient,
        )
        .map_err(|e| FetchError::DataFetch {
            layer: layer.to_string(),
            reason: e.to_string(),
        })
    }
}

impl DataFetcher for CachingDataFetcher {
    fn fetch_graph(&self, center: &Coordinates, radius_m: u32) -> Result<StreetGraph, FetchError> {
        validate_radius(radius_m)?;
        let empty = || FetchError::EmptyRegion {
            layer: STREETS_LAYER.to_string(),
            center: *center,
            radius_m,
        };

        let key = CacheKey::graph(center, radius_m);
        if let Some(graph) = cache::load::<StreetGraph>(self.cache.as_ref(), &key) {
            info!(edges = graph.edge_count(), "Using cached street network");
            return if graph.is_empty() { Err(empty()) } else { Ok(graph) };
        }

        info!(radius_m, source = self.source.name(), "Downloading street network");
        let bbox = bounding_box(center, radius_m);
        let graph = self.request(STREETS_LAYER, &self.graph_limiter, || {
            self.source.street_graph(&bbox)
        })?;

        if graph.is_empty() {
            return Err(empty());
        }

        info!(nodes = graph.node_count(), edges = graph.edge_count(), "Street network downloaded");
        if !cache::store(self.cache.as_ref(), &key, &graph, self.ttl) {
            debug!(key = %key, "Street network returned uncached");
        }
        Ok(graph)
    }

    fn fetch_features(
        &self,
        center: &Coordinates,
        radius_m: u32,
        filter: &TagFilter,
    ) -> Result<FeatureLayer, FetchError> {
        validate_radius(radius_m)?;
        let empty = || FetchError::EmptyRegion {
            layer: filter.name().to_string(),
            center: *center,
            radius_m,
        };

        let key = CacheKey::features(center, radius_m, &filter.identity());
        let layer = match cache::load::<FeatureLayer>(self.cache.as_ref(), &key) {
            Some(layer) => {
                info!(layer = filter.name(), features = layer.len(), "Using cached features");
                layer
            }
            None => {
                info!(layer = filter.name(), radius_m, "Downloading features");
                let bbox = bounding_box(center, radius_m);
                let layer = self.request(filter.name(), &self.features_limiter, || {
                    self.source.features(&bbox, filter)
                })?;
                info!(layer = filter.name(), features = layer.len(), "Features downloaded");
                if !cache::store(self.cache.as_ref(), &key, &layer, self.ttl) {
                    debug!(key = %key, layer = filter.name(), "Features returned uncached");
                }
                layer
            }
        };

        if layer.is_empty() {
            Err(empty())
        } else {
            Ok(layer)
        }
    }
}
