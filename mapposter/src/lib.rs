//! mapposter - Minimalist city map posters from OpenStreetMap data
//!
//! This library turns a place (city and country, or explicit coordinates)
//! into a themed raster poster of its street network, water and parks.
//!
//! The pipeline is geocode → fetch → render → output:
//!
//! - [`geocode`] resolves a place to [`coord::Coordinates`] through Nominatim
//! - [`fetch`] downloads the street graph, water and parks from Overpass
//! - [`render`] composites the layers with a [`theme::Theme`] and
//!   [`typography`] onto a PNG or JPEG
//! - [`poster`] orchestrates one poster or a batch across all themes
//!
//! Network lookups go through a shared [`cache::CacheStore`] so repeated
//! runs are fast and work offline. [`app::PosterApp`] wires everything from
//! a [`config::PosterConfig`].

pub mod app;
pub mod cache;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod geocode;
pub mod http;
pub mod logging;
pub mod output;
pub mod poster;
pub mod render;
pub mod theme;
pub mod typography;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
