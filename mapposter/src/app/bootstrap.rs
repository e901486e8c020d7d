//! Application wiring.
//!
//! Builds every collaborator of the poster pipeline from a [`PosterConfig`].
//! The cache store is created once here and shared by the geocoder and the
//! data fetcher.

use std::sync::Arc;

use tracing::info;

use super::error::AppError;
use crate::cache::{CacheError, CacheStore, DiskCache, MemoryCache, PurgeResult};
use crate::config::PosterConfig;
use crate::fetch::{CachingDataFetcher, OverpassSource};
use crate::geocode::{CachingGeocoder, NominatimService};
use crate::http::{RateLimiter, ReqwestClient};
use crate::output::OutputNamer;
use crate::poster::{PosterGenerator, PosterRequest};
use crate::render::PosterRenderer;
use crate::theme::ThemeCatalog;
use crate::typography::TypographyProvider;

/// Fully wired poster application.
pub struct PosterApp {
    config: PosterConfig,
    cache: Arc<dyn CacheStore>,
    generator: PosterGenerator,
}

impl PosterApp {
    /// Validates `config` and wires the production collaborators:
    /// disk (or memory) cache, Nominatim geocoder, Overpass fetcher, theme
    /// catalog, fonts, renderer and output naming.
    pub fn from_config(config: PosterConfig) -> Result<Self, AppError> {
        config.validate()?;

        let cache: Arc<dyn CacheStore> = if config.cache.enabled {
            Arc::new(DiskCache::new(&config.paths.cache_dir))
        } else {
            Arc::new(MemoryCache::new())
        };
        info!(
            store = cache.name(),
            directory = %config.paths.cache_dir.display(),
            "Cache ready"
        );

        let geocoding = &config.geocoding;
        let nominatim = NominatimService::new(ReqwestClient::with_timeout(
            &geocoding.user_agent,
            geocoding.timeout(),
        )?);
        let geocoder = CachingGeocoder::new(
            Arc::new(nominatim),
            Arc::clone(&cache),
            RateLimiter::new(geocoding.rate_limit()),
            geocoding.retry_policy(),
            config.cache.geocode_ttl(),
        );

        let fetch = &config.fetch;
        let overpass = OverpassSource::with_endpoints(
            ReqwestClient::with_timeout(&geocoding.user_agent, fetch.timeout())?,
            fetch.overpass_urls.clone(),
        );
        let fetcher = CachingDataFetcher::new(
            Arc::new(overpass),
            Arc::clone(&cache),
            RateLimiter::new(fetch.graph_rate_limit()),
            RateLimiter::new(fetch.features_rate_limit()),
            fetch.retry_policy(),
            config.cache.data_ttl(),
        );

        let typography = TypographyProvider::from_dir(&config.paths.fonts_dir);
        let renderer = PosterRenderer::new(typography, config.render.canvas());

        let generator = PosterGenerator::new(
            Arc::new(geocoder),
            Arc::new(fetcher),
            ThemeCatalog::new(&config.paths.themes_dir),
            Arc::new(renderer),
            OutputNamer::new(&config.paths.output_dir),
        )
        .with_parallelism(config.render.parallel_themes);

        info!(
            themes = %config.paths.themes_dir.display(),
            output = %config.paths.output_dir.display(),
            "Poster application ready"
        );

        Ok(Self {
            config,
            cache,
            generator,
        })
    }

    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    pub fn generator(&self) -> &PosterGenerator {
        &self.generator
    }

    pub fn themes(&self) -> &ThemeCatalog {
        self.generator.themes()
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// A request for a place using the configured theme, radius and format.
    pub fn request(&self, city: &str, country: &str) -> PosterRequest {
        let render = &self.config.render;
        PosterRequest::new(city, country)
            .with_theme(render.theme.clone())
            .with_radius(render.distance_m)
            .with_format(render.format)
    }

    /// Removes every cached lookup.
    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear()
    }

    /// Removes expired cached lookups.
    pub fn purge_expired(&self) -> Result<PurgeResult, CacheError> {
        self.cache.purge_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheKey;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(temp: &TempDir) -> PosterConfig {
        let mut config = PosterConfig::default();
        config.paths.cache_dir = temp.path().join("cache");
        config.paths.themes_dir = temp.path().join("themes");
        config.paths.fonts_dir = temp.path().join("fonts");
        config.paths.output_dir = temp.path().join("posters");
        config
    }

    #[test]
    fn test_from_config_uses_disk_cache() {
        let temp = TempDir::new().unwrap();
        let app = PosterApp::from_config(config(&temp)).unwrap();
        assert_eq!(app.cache().name(), "disk");
    }

    #[test]
    fn test_disabled_cache_uses_memory() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.cache.enabled = false;
        let app = PosterApp::from_config(config).unwrap();
        assert_eq!(app.cache().name(), "memory");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.render.dpi = 0;
        assert!(matches!(PosterApp::from_config(config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_request_uses_configured_defaults() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.render.theme = "noir".into();
        config.render.distance_m = 8000;
        let app = PosterApp::from_config(config).unwrap();

        let request = app.request("Venice", "Italy");
        assert_eq!(request.theme, "noir");
        assert_eq!(request.radius_m, 8000);
    }

    #[test]
    fn test_render_parallelism_from_config() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.render.parallel_themes = 3;
        let app = PosterApp::from_config(config).unwrap();
        assert_eq!(app.generator().parallelism(), 3);
    }

    #[test]
    fn test_clear_cache() {
        let temp = TempDir::new().unwrap();
        let app = PosterApp::from_config(config(&temp)).unwrap();
        let key = CacheKey::geocode("Paris", "France");
        app.cache().put(&key, vec![1], Duration::from_secs(60)).unwrap();

        app.clear_cache().unwrap();
        assert!(app.cache().get(&key).is_none());
        assert_eq!(app.purge_expired().unwrap().entries_removed, 0);
    }
}
