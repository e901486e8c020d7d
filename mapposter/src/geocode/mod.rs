//! Place-name geocoding.
//!
//! [`CachingGeocoder`] wraps a [`GeocodingService`] (the external lookup, by
//! default [`NominatimService`]) with the shared cache store, a rate limiter
//! and a retry policy. Callers depend on the [`Geocoder`] trait only.

mod caching;
mod nominatim;

pub use caching::CachingGeocoder;
pub use nominatim::{NominatimService, NOMINATIM_SEARCH_URL};

use thiserror::Error;

use crate::coord::{CoordError, Coordinates};
use crate::http::HttpError;

/// Errors from geocoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// City or country was blank.
    #[error("City and country must not be empty")]
    EmptyQuery,

    /// The service had no match for the query.
    #[error("Could not find coordinates for {city}, {country}")]
    NotFound { city: String, country: String },

    /// The service could not be reached or answered with an error.
    #[error("Geocoding service failed: {0}")]
    Service(#[from] HttpError),

    /// The service answered with something we could not interpret.
    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),

    /// The service returned coordinates outside the valid range.
    #[error("Geocoding returned invalid coordinates: {0}")]
    InvalidCoordinates(#[from] CoordError),
}

impl GeocodeError {
    fn is_transient(&self) -> bool {
        matches!(self, GeocodeError::Service(e) if e.is_transient())
    }
}

/// A single match from a geocoding service.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub coordinates: Coordinates,
    /// Full place description, when the service supplies one.
    pub display_name: Option<String>,
}

/// External lookup from a free-text query to the best matching place.
pub trait GeocodingService: Send + Sync {
    /// Returns the best match, or `None` if nothing matched.
    fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError>;

    /// Service name for logs.
    fn name(&self) -> &str;
}

/// Resolves a (city, country) pair to coordinates.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, city: &str, country: &str) -> Result<Coordinates, GeocodeError>;
}
