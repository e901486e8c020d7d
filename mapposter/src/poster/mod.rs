//! Poster generation pipeline.
//!
//! [`PosterGenerator`] runs geocode → fetch → render → output for one
//! request. In multi-theme mode the place is geocoded and fetched once and
//! the themes are rendered from the shared data on a small dedicated pool,
//! at most [`DEFAULT_PARALLEL_THEMES`] (or the configured number) at a time.

mod types;

pub use types::{BatchReport, PosterError, PosterRequest, Stage, StageError, ThemeOutcome};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

use crate::coord::Coordinates;
use crate::fetch::{DataFetcher, MapData};
use crate::geocode::Geocoder;
use crate::output::OutputNamer;
use crate::render::{RenderRequest, Renderer};
use crate::theme::{Theme, ThemeCatalog, ThemeError};

/// Themes rendered concurrently in all-themes mode. Every render holds a
/// full-size canvas.
pub const DEFAULT_PARALLEL_THEMES: usize = 2;

/// Produces posters from its injected collaborators.
pub struct PosterGenerator {
    geocoder: Arc<dyn Geocoder>,
    fetcher: Arc<dyn DataFetcher>,
    themes: ThemeCatalog,
    renderer: Arc<dyn Renderer>,
    output: OutputNamer,
    parallelism: usize,
}

impl PosterGenerator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        fetcher: Arc<dyn DataFetcher>,
        themes: ThemeCatalog,
        renderer: Arc<dyn Renderer>,
        output: OutputNamer,
    ) -> Self {
        Self {
            geocoder,
            fetcher,
            themes,
            renderer,
            output,
            parallelism: DEFAULT_PARALLEL_THEMES,
        }
    }

    /// Sets how many themes render at once in all-themes mode (minimum 1).
    pub fn with_parallelism(mut self, themes: usize) -> Self {
        self.parallelism = themes.max(1);
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn themes(&self) -> &ThemeCatalog {
        &self.themes
    }

    pub fn output(&self) -> &OutputNamer {
        &self.output
    }

    /// Generates one poster and returns its path.
    ///
    /// The theme is loaded before any network access so a bad theme name
    /// fails fast.
    pub fn generate_poster(&self, request: &PosterRequest) -> Result<PathBuf, PosterError> {
        let started = Instant::now();
        let theme = self.themes.load_theme(&request.theme)?;
        let (coordinates, data) = self.prepare(request)?;
        let path = self.render_theme(request, &request.theme, theme, coordinates, data)?;
        info!(
            path = %path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Poster complete"
        );
        Ok(path)
    }

    /// Generates one poster per available theme.
    ///
    /// Geocoding and fetch failures abort the batch; a failing theme is
    /// recorded in the report and the others continue.
    pub fn generate_all_themes(&self, request: &PosterRequest) -> Result<BatchReport, PosterError> {
        self.generate_all_themes_with(request, |_| {})
    }

    /// Like [`generate_all_themes`](Self::generate_all_themes), calling
    /// `on_outcome` as each theme finishes.
    pub fn generate_all_themes_with<F>(
        &self,
        request: &PosterRequest,
        on_outcome: F,
    ) -> Result<BatchReport, PosterError>
    where
        F: Fn(&ThemeOutcome) + Sync,
    {
        let themes = self.themes.list_themes()?;
        if themes.is_empty() {
            return Err(ThemeError::NotFound(format!(
                "no themes in {}",
                self.themes.dir().display()
            ))
            .into());
        }

        let (coordinates, data) = self.prepare(request)?;
        info!(count = themes.len(), parallel = self.parallelism, "Rendering all themes");

        let render_one = |identifier: &String| {
            let result = self
                .themes
                .load_theme(identifier)
                .map_err(PosterError::from)
                .and_then(|theme| {
                    self.render_theme(request, identifier, theme, coordinates, Arc::clone(&data))
                });
            if let Err(e) = &result {
                warn!(theme = %identifier, error = %e, "Theme failed");
            }
            let outcome = ThemeOutcome {
                theme: identifier.clone(),
                result,
            };
            on_outcome(&outcome);
            outcome
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.parallelism)
            .thread_name(|i| format!("render-{i}"))
            .build();
        let outcomes: Vec<ThemeOutcome> = match pool {
            Ok(pool) => pool.install(|| themes.par_iter().map(render_one).collect()),
            Err(e) => {
                warn!(error = %e, "Render pool unavailable, rendering themes one by one");
                themes.iter().map(render_one).collect()
            }
        };

        let report = BatchReport { outcomes };
        info!(summary = %report, "All themes done");
        Ok(report)
    }

    fn resolve_coordinates(&self, request: &PosterRequest) -> Result<Coordinates, PosterError> {
        match request.coordinates {
            Some(coordinates) => {
                info!(%coordinates, "Using supplied coordinates");
                Ok(coordinates)
            }
            None => {
                let coordinates = self.geocoder.geocode(&request.city, &request.country)?;
                info!(city = %request.city, country = %request.country, %coordinates, "Geocoded");
                Ok(coordinates)
            }
        }
    }

    fn prepare(&self, request: &PosterRequest) -> Result<(Coordinates, Arc<MapData>), PosterError> {
        let coordinates = self.resolve_coordinates(request)?;
        let data = self.fetcher.fetch_all(&coordinates, request.radius_m)?;
        Ok((coordinates, Arc::new(data)))
    }

    fn render_theme(
        &self,
        request: &PosterRequest,
        identifier: &str,
        theme: Theme,
        coordinates: Coordinates,
        data: Arc<MapData>,
    ) -> Result<PathBuf, PosterError> {
        let output_path = self.output.path_for(&request.city, identifier, request.format)?;
        self.renderer.render(RenderRequest {
            data,
            city: request.city.clone(),
            country: request.country.clone(),
            coordinates,
            country_label: request.country_label.clone(),
            theme,
            output_path: output_path.clone(),
            format: request.format,
        })?;
        Ok(output_path)
    }
}
