//! Loading configuration from `config.ini` and the environment.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::PosterConfig;

/// Environment variables that override directory settings.
pub const ENV_CACHE_DIR: &str = "CACHE_DIR";
pub const ENV_THEMES_DIR: &str = "THEMES_DIR";
pub const ENV_FONTS_DIR: &str = "FONTS_DIR";
pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFileError {
    pub(super) fn invalid(section: &str, key: &str, value: impl ToString, reason: &str) -> Self {
        ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl PosterConfig {
    /// Defaults, then `path` if it exists, then environment overrides.
    /// The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigFileError> {
        let default_path = config_file_path();
        let path = path.unwrap_or(&default_path);
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file without environment overrides.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Applies `CACHE_DIR`, `THEMES_DIR`, `FONTS_DIR` and `OUTPUT_DIR`.
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let paths = &mut self.paths;
        for (name, target) in [
            (ENV_CACHE_DIR, &mut paths.cache_dir),
            (ENV_THEMES_DIR, &mut paths.themes_dir),
            (ENV_FONTS_DIR, &mut paths.fonts_dir),
            (ENV_OUTPUT_DIR, &mut paths.output_dir),
        ] {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *target = PathBuf::from(value);
            }
        }
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        let g = &self.geocoding;
        if g.timeout_secs == 0 {
            return Err(ConfigFileError::invalid("geocoding", "timeout", 0, "must be positive"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigFileError::invalid("fetch", "timeout", 0, "must be positive"));
        }
        for (section, key, value) in [
            ("geocoding", "rate_limit", g.rate_limit_secs),
            ("fetch", "graph_rate_limit", self.fetch.graph_rate_limit_secs),
            ("fetch", "features_rate_limit", self.fetch.features_rate_limit_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigFileError::invalid(section, key, value, "must be non-negative"));
            }
        }

        let r = &self.render;
        if r.dpi == 0 {
            return Err(ConfigFileError::invalid("render", "dpi", 0, "must be positive"));
        }
        if r.parallel_themes == 0 {
            return Err(ConfigFileError::invalid("render", "parallel_themes", 0, "must be positive"));
        }
        if r.distance_m == 0 || r.distance_m > crate::fetch::MAX_RADIUS_M {
            return Err(ConfigFileError::invalid(
                "render",
                "distance",
                r.distance_m,
                "must be between 1 and 100000 meters",
            ));
        }
        for (key, value) in [("width", r.width_in), ("height", r.height_in)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigFileError::invalid("render", key, value, "must be positive"));
            }
        }
        if self.fetch.overpass_urls.is_empty() {
            return Err(ConfigFileError::invalid("fetch", "overpass_urls", "", "at least one URL is required"));
        }
        Ok(())
    }
}

/// Get the path to the config directory (~/.mapposter).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mapposter")
}

/// Get the path to the config file (~/.mapposter/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PosterConfig::default();

        assert_eq!(config.geocoding.user_agent, "city_map_poster");
        assert_eq!(config.geocoding.timeout_secs, 10);
        assert_eq!(config.geocoding.rate_limit_secs, 1.0);
        assert_eq!(config.fetch.graph_rate_limit_secs, 0.5);
        assert_eq!(config.fetch.features_rate_limit_secs, 0.3);
        assert_eq!((config.render.width_in, config.render.height_in), (12.0, 16.0));
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.render.distance_m, DEFAULT_DISTANCE_M);
        assert_eq!(config.cache.geocode_ttl().as_secs(), 30 * 86_400);
        assert_eq!(config.cache.data_ttl().as_secs(), 7 * 86_400);
        assert_eq!(config.geocoding.retries, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = PosterConfig::load_from(&temp_dir.path().join("nonexistent.ini")).unwrap();
        assert_eq!(config, PosterConfig::default());
    }

    #[test]
    fn test_env_overrides_directories() {
        let env: HashMap<&str, &str> = [
            ("CACHE_DIR", "/tmp/c"),
            ("THEMES_DIR", "/tmp/t"),
            ("OUTPUT_DIR", ""),
        ]
        .into_iter()
        .collect();
        let mut config = PosterConfig::default();
        config.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.paths.cache_dir, PathBuf::from("/tmp/c"));
        assert_eq!(config.paths.themes_dir, PathBuf::from("/tmp/t"));
        assert_eq!(config.paths.fonts_dir, PathBuf::from(DEFAULT_FONTS_DIR));
        assert_eq!(config.paths.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PosterConfig::default();
        config.geocoding.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = PosterConfig::default();
        config.fetch.graph_rate_limit_secs = -0.1;
        assert!(config.validate().is_err());

        let mut config = PosterConfig::default();
        config.render.dpi = 0;
        assert!(config.validate().is_err());

        let mut config = PosterConfig::default();
        config.render.distance_m = 0;
        assert!(config.validate().is_err());

        let mut config = PosterConfig::default();
        config.render.parallel_themes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.parallel_themes"));

        let mut config = PosterConfig::default();
        config.render.height_in = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.height"));
    }

    #[test]
    fn test_zero_rate_limit_is_allowed() {
        let mut config = PosterConfig::default();
        config.geocoding.rate_limit_secs = 0.0;
        assert!(config.validate().is_ok());
    }
}
