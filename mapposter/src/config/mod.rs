//! Application configuration.
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! `config.ini` (sections `[paths]`, `[geocoding]`, `[fetch]`, `[render]`,
//! `[cache]`), and environment overrides for the directories.
//!
//! # Example
//!
//! ```
//! use mapposter::config::PosterConfig;
//!
//! let config = PosterConfig::default();
//! assert_eq!(config.render.dpi, 300);
//! assert!(config.validate().is_ok());
//! ```

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::*;
pub use file::{
    config_directory, config_file_path, ConfigFileError, ENV_CACHE_DIR, ENV_FONTS_DIR,
    ENV_OUTPUT_DIR, ENV_THEMES_DIR,
};
pub use settings::{
    CacheSettings, FetchSettings, GeocodingSettings, PathSettings, PosterConfig, RenderSettings,
};
