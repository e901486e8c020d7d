//! Poster requests, errors and batch reports.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::DEFAULT_DISTANCE_M;
use crate::coord::Coordinates;
use crate::fetch::FetchError;
use crate::geocode::GeocodeError;
use crate::render::{OutputFormat, RenderError};
use crate::theme::{ThemeError, DEFAULT_THEME};

/// What to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct PosterRequest {
    pub city: String,
    pub country: String,
    /// Skips geocoding when set.
    pub coordinates: Option<Coordinates>,
    /// Replaces the country name on the poster.
    pub country_label: Option<String>,
    pub theme: String,
    pub radius_m: u32,
    pub format: OutputFormat,
}

impl PosterRequest {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            coordinates: None,
            country_label: None,
            theme: DEFAULT_THEME.to_string(),
            radius_m: DEFAULT_DISTANCE_M,
            format: OutputFormat::Png,
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_country_label(mut self, label: impl Into<String>) -> Self {
        self.country_label = Some(label.into());
        self
    }
}

/// Pipeline stage a poster failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Geocode,
    Fetch,
    Theme,
    Render,
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Geocode => "geocode",
            Stage::Fetch => "fetch",
            Stage::Theme => "theme",
            Stage::Render => "render",
            Stage::Output => "output",
        })
    }
}

/// Underlying cause of a [`PosterError`].
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Output(#[from] io::Error),
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Geocode(_) => Stage::Geocode,
            StageError::Fetch(_) => Stage::Fetch,
            StageError::Theme(_) => Stage::Theme,
            StageError::Render(_) => Stage::Render,
            StageError::Output(_) => Stage::Output,
        }
    }
}

/// A poster that could not be produced.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PosterError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

macro_rules! poster_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PosterError {
                fn from(e: $ty) -> Self {
                    let source = StageError::from(e);
                    Self { stage: source.stage(), source }
                }
            }
        )*
    };
}

poster_error_from!(GeocodeError, FetchError, ThemeError, RenderError, io::Error);

/// Result of one theme in a multi-theme run.
#[derive(Debug)]
pub struct ThemeOutcome {
    pub theme: String,
    pub result: Result<PathBuf, PosterError>,
}

impl ThemeOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-theme results of a multi-theme run, in theme order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ThemeOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ThemeOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.total()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} rendered", self.succeeded(), self.total())
    }
}
