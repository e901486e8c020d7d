//! Poster themes.
//!
//! Themes are JSON files in a themes directory, addressed by file stem.
//! See [`ThemeCatalog`] for loading and listing.

mod catalog;
mod color;
mod model;

pub use catalog::{ThemeCatalog, ThemeInfo};
pub use color::{Color, ParseColorError};
pub use model::Theme;

use std::path::PathBuf;

use thiserror::Error;

/// Theme used when none is requested.
pub const DEFAULT_THEME: &str = "feature_based";

/// Errors from theme loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThemeError {
    #[error("Theme '{0}' not found")]
    NotFound(String),

    #[error("Invalid theme '{theme}': {reason}")]
    Validation { theme: String, reason: String },

    #[error("Failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}
