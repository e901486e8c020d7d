//! Configuration settings structs.

use std::path::PathBuf;
use std::time::Duration;

use crate::http::RetryPolicy;
use crate::render::{CanvasSpec, OutputFormat};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Negative or non-finite values read as zero.
fn secs_f64(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_default()
}

/// Full application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PosterConfig {
    pub paths: PathSettings,
    pub geocoding: GeocodingSettings,
    pub fetch: FetchSettings,
    pub render: RenderSettings,
    pub cache: CacheSettings,
}

/// `[paths]`
#[derive(Debug, Clone, PartialEq)]
pub struct PathSettings {
    pub cache_dir: PathBuf,
    pub themes_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
}

/// `[geocoding]`
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub rate_limit_secs: f64,
    pub retries: u32,
}

/// `[fetch]`
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub graph_rate_limit_secs: f64,
    pub features_rate_limit_secs: f64,
    pub retries: u32,
    /// Overpass endpoints, tried in order.
    pub overpass_urls: Vec<String>,
}

/// `[render]`
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width_in: f32,
    pub height_in: f32,
    pub dpi: u32,
    /// Default map radius in meters.
    pub distance_m: u32,
    pub format: OutputFormat,
    pub theme: String,
    /// Themes rendered at once with `--all-themes`.
    pub parallel_themes: usize,
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// When false, lookups are cached in memory for the current run only.
    pub enabled: bool,
    pub geocode_ttl_days: u64,
    pub data_ttl_days: u64,
}

impl GeocodingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit(&self) -> Duration {
        secs_f64(self.rate_limit_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.retries)
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn graph_rate_limit(&self) -> Duration {
        secs_f64(self.graph_rate_limit_secs)
    }

    pub fn features_rate_limit(&self) -> Duration {
        secs_f64(self.features_rate_limit_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.retries)
    }
}

impl RenderSettings {
    pub fn canvas(&self) -> CanvasSpec {
        CanvasSpec {
            width_in: self.width_in,
            height_in: self.height_in,
            dpi: self.dpi,
        }
    }
}

impl CacheSettings {
    pub fn geocode_ttl(&self) -> Duration {
        Duration::from_secs(self.geocode_ttl_days.saturating_mul(SECS_PER_DAY))
    }

    pub fn data_ttl(&self) -> Duration {
        Duration::from_secs(self.data_ttl_days.saturating_mul(SECS_PER_DAY))
    }
}
