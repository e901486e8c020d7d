//! Directory of JSON theme files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use super::model::{Theme, ThemeFile};
use super::ThemeError;

const THEME_EXTENSION: &str = "json";

/// Name and description of a theme, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeInfo {
    pub identifier: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeHeader {
    name: Option<String>,
    description: Option<String>,
}

/// Loads themes by identifier (file stem) from a directory.
///
/// Loading has no side effects; the same identifier always yields the
/// same theme while the file is unchanged.
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    dir: PathBuf,
}

impl ThemeCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, identifier: &str) -> Result<PathBuf, ThemeError> {
        let valid = !identifier.is_empty()
            && identifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ThemeError::NotFound(identifier.to_string()));
        }
        Ok(self.dir.join(format!("{identifier}.{THEME_EXTENSION}")))
    }

    fn read(&self, identifier: &str) -> Result<String, ThemeError> {
        let path = self.path_for(identifier)?;
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ThemeError::NotFound(identifier.to_string()),
            _ => ThemeError::Io {
                path: path.clone(),
                reason: e.to_string(),
            },
        })
    }

    /// Loads and validates a theme.
    pub fn load_theme(&self, identifier: &str) -> Result<Theme, ThemeError> {
        let json = self.read(identifier)?;
        let file: ThemeFile =
            serde_json::from_str(&json).map_err(|e| ThemeError::Validation {
                theme: identifier.to_string(),
                reason: e.to_string(),
            })?;
        let theme = file.resolve(identifier)?;
        info!(theme = identifier, name = %theme.name, "Loaded theme");
        Ok(theme)
    }

    /// Theme identifiers in lexicographic order.
    ///
    /// A missing directory lists no themes.
    pub fn list_themes(&self) -> Result<Vec<String>, ThemeError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Themes directory missing");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(ThemeError::Io {
                    path: self.dir.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let mut themes: Vec<String> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(THEME_EXTENSION)
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        themes.sort();
        Ok(themes)
    }

    /// Name and description without full validation.
    ///
    /// Unreadable files fall back to the identifier and an empty description.
    pub fn theme_info(&self, identifier: &str) -> ThemeInfo {
        let header = self
            .read(identifier)
            .ok()
            .and_then(|json| serde_json::from_str::<ThemeHeader>(&json).ok())
            .unwrap_or_default();

        ThemeInfo {
            identifier: identifier.to_string(),
            name: header.name.unwrap_or_else(|| identifier.to_string()),
            description: header.description.unwrap_or_default(),
        }
    }
}
