//! OSM data fetching.
//!
//! A [`GeoDataSource`] talks to the external service (Overpass by default).
//! [`CachingDataFetcher`] puts the shared cache, rate limiting and retries in
//! front of it and implements [`DataFetcher`], which the poster pipeline
//! depends on.
//!
//! # Layer policy
//!
//! The street graph is mandatory: failure or emptiness aborts the poster.
//! Water and parks are optional and degrade to empty layers in
//! [`DataFetcher::fetch_all`].

mod assemble;
mod caching;
mod overpass;
mod types;

pub use caching::CachingDataFetcher;
pub use overpass::{
    features_query, graph_query, OverpassSource, DEFAULT_OVERPASS_URLS, DEFAULT_QUERY_TIMEOUT_SECS,
};
pub use types::{
    FeatureLayer, GeoPoint, Geometry, GraphEdge, GraphNode, MapData, Polygon, Ring, RoadClass,
    StreetGraph, TagFilter,
};

use std::thread;

use thiserror::Error;
use tracing::{info, warn};

use crate::coord::{BoundingBox, Coordinates};
use crate::http::HttpError;

/// Largest accepted fetch radius in meters.
pub const MAX_RADIUS_M: u32 = 100_000;

/// Layer name used for the street network in logs and errors.
pub const STREETS_LAYER: &str = "street network";

/// Errors from the data fetcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The service failed after all retries.
    #[error("Failed to fetch {layer}: {reason}")]
    DataFetch { layer: String, reason: String },

    /// The service returned no data for the layer.
    #[error("No {layer} data found within {radius_m} m of {center}")]
    EmptyRegion {
        layer: String,
        center: Coordinates,
        radius_m: u32,
    },

    /// Radius of zero or above [`MAX_RADIUS_M`].
    #[error("Invalid radius {0} m (must be between 1 and {MAX_RADIUS_M})")]
    InvalidRadius(u32),
}

/// Errors reported by a [`GeoDataSource`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The service answered with something we could not interpret.
    #[error("{0}")]
    InvalidResponse(String),

    /// The service reported a failure inside a successful response.
    #[error("service error: {0}")]
    Remote(String),
}

impl SourceError {
    /// Whether retrying may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(e) => e.is_transient(),
            SourceError::Remote(_) => true,
            SourceError::InvalidResponse(_) => false,
        }
    }
}

/// External provider of OSM geometry for a bounding box.
pub trait GeoDataSource: Send + Sync {
    fn street_graph(&self, bbox: &BoundingBox) -> Result<StreetGraph, SourceError>;

    fn features(&self, bbox: &BoundingBox, filter: &TagFilter) -> Result<FeatureLayer, SourceError>;

    /// Source name for logs.
    fn name(&self) -> &str;
}

/// Rejects radii outside `1..=MAX_RADIUS_M`.
pub fn validate_radius(radius_m: u32) -> Result<(), FetchError> {
    if radius_m == 0 || radius_m > MAX_RADIUS_M {
        return Err(FetchError::InvalidRadius(radius_m));
    }
    Ok(())
}

/// Fetches the layers of a poster around a center point.
pub trait DataFetcher: Send + Sync {
    /// Street network within `radius_m` of `center`. Empty networks are
    /// reported as [`FetchError::EmptyRegion`].
    fn fetch_graph(&self, center: &Coordinates, radius_m: u32) -> Result<StreetGraph, FetchError>;

    /// Polygonal features matching `filter`. Empty layers are reported as
    /// [`FetchError::EmptyRegion`].
    fn fetch_features(
        &self,
        center: &Coordinates,
        radius_m: u32,
        filter: &TagFilter,
    ) -> Result<FeatureLayer, FetchError>;

    /// Fetches the street graph, water and parks concurrently.
    ///
    /// Water and parks degrade to empty layers on any failure; a street
    /// graph failure is returned as is.
    fn fetch_all(&self, center: &Coordinates, radius_m: u32) -> Result<MapData, FetchError> {
        validate_radius(radius_m)?;

        let water_filter = TagFilter::water();
        let parks_filter = TagFilter::parks();

        let (graph, water, parks) = thread::scope(|s| {
            let water = s.spawn(|| self.fetch_features(center, radius_m, &water_filter));
            let parks = s.spawn(|| self.fetch_features(center, radius_m, &parks_filter));
            let graph = self.fetch_graph(center, radius_m);
            (graph, join_layer(water, &water_filter), join_layer(parks, &parks_filter))
        });

        let graph = graph?;
        let data = MapData {
            water: optional_layer(water, &water_filter),
            parks: optional_layer(parks, &parks_filter),
            graph,
        };

        info!(
            nodes = data.graph.node_count(),
            edges = data.graph.edge_count(),
            water = data.water.len(),
            parks = data.parks.len(),
            "Map data ready"
        );
        Ok(data)
    }
}

fn join_layer(
    handle: thread::ScopedJoinHandle<'_, Result<FeatureLayer, FetchError>>,
    filter: &TagFilter,
) -> Result<FeatureLayer, FetchError> {
    handle.join().unwrap_or_else(|_| {
        Err(FetchError::DataFetch {
            layer: filter.name().to_string(),
            reason: "worker thread panicked".to_string(),
        })
    })
}

fn optional_layer(result: Result<FeatureLayer, FetchError>, filter: &TagFilter) -> FeatureLayer {
    match result {
        Ok(layer) => layer,
        Err(FetchError::EmptyRegion { .. }) => {
            info!(layer = filter.name(), "No features in region");
            FeatureLayer::empty()
        }
        Err(e) => {
            warn!(layer = filter.name(), error = %e, "Optional layer unavailable, continuing without it");
            FeatureLayer::empty()
        }
    }
}
