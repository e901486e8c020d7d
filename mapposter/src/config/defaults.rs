//! Default values for every configuration setting.

use std::path::PathBuf;

use super::settings::*;
use crate::render::OutputFormat;
use crate::theme::DEFAULT_THEME;

pub const DEFAULT_CACHE_DIR: &str = ".cache";
pub const DEFAULT_THEMES_DIR: &str = "themes";
pub const DEFAULT_FONTS_DIR: &str = "fonts";
pub const DEFAULT_OUTPUT_DIR: &str = crate::output::DEFAULT_OUTPUT_DIR;
pub const DEFAULT_LOG_DIR: &str = crate::logging::DEFAULT_LOG_DIR;

pub const DEFAULT_GEOCODING_USER_AGENT: &str = "city_map_poster";
pub const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 10;
/// Minimum seconds between geocoding requests.
pub const DEFAULT_GEOCODING_RATE_LIMIT_SECS: f64 = 1.0;

/// HTTP timeout for data requests; must outlast the Overpass query timeout.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 200;
pub const DEFAULT_GRAPH_RATE_LIMIT_SECS: f64 = 0.5;
pub const DEFAULT_FEATURES_RATE_LIMIT_SECS: f64 = 0.3;

/// Retries after the first attempt of a network request.
pub const DEFAULT_RETRIES: u32 = 2;

pub const DEFAULT_WIDTH_IN: f32 = crate::render::DEFAULT_WIDTH_IN;
pub const DEFAULT_HEIGHT_IN: f32 = crate::render::DEFAULT_HEIGHT_IN;
pub const DEFAULT_DPI: u32 = crate::render::DEFAULT_DPI;
/// Default map radius in meters.
pub const DEFAULT_DISTANCE_M: u32 = 29_000;
pub const DEFAULT_PARALLEL_THEMES: usize = crate::poster::DEFAULT_PARALLEL_THEMES;

pub const DEFAULT_GEOCODE_TTL_DAYS: u64 = 30;
pub const DEFAULT_DATA_TTL_DAYS: u64 = 7;

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            themes_dir: PathBuf::from(DEFAULT_THEMES_DIR),
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_GEOCODING_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_GEOCODING_TIMEOUT_SECS,
            rate_limit_secs: DEFAULT_GEOCODING_RATE_LIMIT_SECS,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            graph_rate_limit_secs: DEFAULT_GRAPH_RATE_LIMIT_SECS,
            features_rate_limit_secs: DEFAULT_FEATURES_RATE_LIMIT_SECS,
            retries: DEFAULT_RETRIES,
            overpass_urls: crate::fetch::DEFAULT_OVERPASS_URLS
                .iter()
                .map(|u| u.to_string())
                .collect(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width_in: DEFAULT_WIDTH_IN,
            height_in: DEFAULT_HEIGHT_IN,
            dpi: DEFAULT_DPI,
            distance_m: DEFAULT_DISTANCE_M,
            format: OutputFormat::Png,
            theme: DEFAULT_THEME.to_string(),
            parallel_themes: DEFAULT_PARALLEL_THEMES,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            geocode_ttl_days: DEFAULT_GEOCODE_TTL_DAYS,
            data_ttl_days: DEFAULT_DATA_TTL_DAYS,
        }
    }
}
