//! Nominatim search API client.
//!
//! Issues `GET /search?q={city}, {country}&format=json&limit=1` and reads the
//! first result. Nominatim encodes `lat`/`lon` as strings.

use serde::Deserialize;
use tracing::debug;

use super::{GeocodeError, GeocodeHit, GeocodingService};
use crate::coord::Coordinates;
use crate::http::HttpClient;

/// Public Nominatim search endpoint.
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Geocoding service backed by a Nominatim instance.
pub struct NominatimService<C: HttpClient> {
    http_client: C,
    search_url: String,
}

impl<C: HttpClient> NominatimService<C> {
    /// Creates a service against the public Nominatim endpoint.
    ///
    /// The user agent and timeout are properties of `http_client`.
    pub fn new(http_client: C) -> Self {
        Self::with_url(http_client, NOMINATIM_SEARCH_URL)
    }

    /// Creates a service against a self-hosted instance.
    pub fn with_url(http_client: C, search_url: impl Into<String>) -> Self {
        Self {
            http_client,
            search_url: search_url.into(),
        }
    }

    fn parse(body: &[u8]) -> Result<Option<GeocodeHit>, GeocodeError> {
        let places: Vec<NominatimPlace> = serde_json::from_slice(body)
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let parse_degrees = |field: &str, value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| GeocodeError::InvalidResponse(format!("{field} is not a number: {value:?}")))
        };
        let lat = parse_degrees("lat", &place.lat)?;
        let lon = parse_degrees("lon", &place.lon)?;

        Ok(Some(GeocodeHit {
            coordinates: Coordinates::new(lat, lon)?,
            display_name: place.display_name,
        }))
    }
}

impl<C: HttpClient> GeocodingService for NominatimService<C> {
    fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        debug!(query, url = %self.search_url, "Nominatim search");
        let body = self.http_client.get(
            &self.search_url,
            &[("q", query), ("format", "json"), ("limit", "1")],
        )?;
        Self::parse(&body)
    }

    fn name(&self) -> &str {
        "nominatim"
    }
}
