//! Output file naming.
//!
//! Posters are written as `{city_slug}_{theme}_{YYYYmmdd_HHMMSS}.{ext}` in
//! the output directory, which is created on demand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use crate::cache::{Clock, SystemClock};
use crate::render::OutputFormat;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "posters";

/// Chooses output paths for posters.
#[derive(Clone)]
pub struct OutputNamer {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for OutputNamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputNamer").field("dir", &self.dir).finish()
    }
}

impl OutputNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a new poster, creating the output directory if needed.
    pub fn path_for(&self, city: &str, theme: &str, format: OutputFormat) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        Ok(self.dir.join(self.file_name(city, theme, format)))
    }

    /// File name for a poster, using local time.
    pub fn file_name(&self, city: &str, theme: &str, format: OutputFormat) -> String {
        let timestamp = self.clock.now().with_timezone(&Local).format("%Y%m%d_%H%M%S");
        format!(
            "{}_{}_{}.{}",
            city_slug(city),
            theme,
            timestamp,
            format.extension()
        )
    }
}

/// Lowercases a city name and replaces whitespace and path separators
/// with underscores.
pub fn city_slug(city: &str) -> String {
    city.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use tempfile::TempDir;

    #[test]
    fn test_city_slug() {
        assert_eq!(city_slug("New York"), "new_york");
        assert_eq!(city_slug(" Paris "), "paris");
        assert_eq!(city_slug("São Paulo"), "são_paulo");
        assert_eq!(city_slug("a/b"), "a_b");
    }

    #[test]
    fn test_file_name_shape() {
        let namer = OutputNamer::with_clock("out", Arc::new(ManualClock::default()));
        let name = namer.file_name("San Francisco", "noir", OutputFormat::Png);

        let rest = name.strip_prefix("san_francisco_noir_").unwrap();
        let stamp = rest.strip_suffix(".png").unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_jpeg_extension() {
        let namer = OutputNamer::new("out");
        assert!(namer.file_name("Rome", "ocean", OutputFormat::Jpeg).ends_with(".jpg"));
    }

    #[test]
    fn test_path_for_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/posters");
        let namer = OutputNamer::new(&dir);

        let path = namer.path_for("Tokyo", "japanese_ink", OutputFormat::Png).unwrap();
        assert!(dir.is_dir());
        assert_eq!(path.parent().unwrap(), dir);
    }
}
