//! Font discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use tracing::{debug, info, warn};

/// Font weights used on the poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Bold,
    Regular,
    Light,
}

impl FontWeight {
    /// Bundled Roboto file name for this weight.
    pub fn file_name(&self) -> &'static str {
        match self {
            FontWeight::Bold => "Roboto-Bold.ttf",
            FontWeight::Regular => "Roboto-Regular.ttf",
            FontWeight::Light => "Roboto-Light.ttf",
        }
    }

    fn system_candidates(&self) -> &'static [&'static str] {
        match self {
            FontWeight::Bold => &[
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
                "/Library/Fonts/Arial Bold.ttf",
                "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
                "C:\\Windows\\Fonts\\arialbd.ttf",
            ],
            FontWeight::Regular | FontWeight::Light => &[
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                "/Library/Fonts/Arial.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
                "C:\\Windows\\Fonts\\arial.ttf",
            ],
        }
    }
}

fn load_font(path: &Path) -> Option<FontArc> {
    let bytes = fs::read(path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable font file");
            None
        }
    }
}

/// The three poster fonts. Any weight may be missing; text drawn in a
/// missing weight is skipped.
#[derive(Clone, Default)]
pub struct FontSet {
    bold: Option<FontArc>,
    regular: Option<FontArc>,
    light: Option<FontArc>,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("bold", &self.bold.is_some())
            .field("regular", &self.regular.is_some())
            .field("light", &self.light.is_some())
            .field("source", &self.source)
            .finish()
    }
}

impl FontSet {
    /// A font set with no fonts; all text is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads Roboto from `fonts_dir`, falling back to common system fonts.
    pub fn load(fonts_dir: &Path) -> Self {
        if let Some(set) = Self::from_dir(fonts_dir) {
            info!(dir = %fonts_dir.display(), "Loaded Roboto fonts");
            return set;
        }

        warn!(dir = %fonts_dir.display(), "Roboto fonts not found, trying system fonts");
        let set = Self::from_system();
        if !set.is_complete() {
            warn!("No usable fonts found; poster text will be omitted");
        }
        set
    }

    /// Loads all three Roboto weights from `dir`, or `None` if any is missing.
    pub fn from_dir(dir: &Path) -> Option<Self> {
        let load = |weight: FontWeight| {
            let path = dir.join(weight.file_name());
            let font = load_font(&path);
            if font.is_none() {
                debug!(path = %path.display(), "Font not found");
            }
            font
        };
        Some(Self {
            bold: Some(load(FontWeight::Bold)?),
            regular: Some(load(FontWeight::Regular)?),
            light: Some(load(FontWeight::Light)?),
            source: Some(dir.to_path_buf()),
        })
    }

    fn from_system() -> Self {
        let find = |weight: FontWeight| {
            weight
                .system_candidates()
                .iter()
                .find_map(|candidate| load_font(Path::new(candidate)))
        };
        Self {
            bold: find(FontWeight::Bold),
            regular: find(FontWeight::Regular),
            light: find(FontWeight::Light),
            source: None,
        }
    }

    /// Builds a set from already loaded fonts.
    pub fn from_fonts(bold: FontArc, regular: FontArc, light: FontArc) -> Self {
        Self {
            bold: Some(bold),
            regular: Some(regular),
            light: Some(light),
            source: None,
        }
    }

    pub fn font(&self, weight: FontWeight) -> Option<&FontArc> {
        match weight {
            FontWeight::Bold => self.bold.as_ref(),
            FontWeight::Regular => self.regular.as_ref(),
            FontWeight::Light => self.light.as_ref().or(self.regular.as_ref()),
        }
    }

    /// True when every weight resolves to a font.
    pub fn is_complete(&self) -> bool {
        [FontWeight::Bold, FontWeight::Regular, FontWeight::Light]
            .iter()
            .all(|w| self.font(*w).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_set_has_no_fonts() {
        let set = FontSet::empty();
        assert!(set.font(FontWeight::Bold).is_none());
        assert!(!set.is_complete());
    }

    #[test]
    fn test_from_dir_missing_files() {
        let temp = TempDir::new().unwrap();
        assert!(FontSet::from_dir(temp.path()).is_none());
    }

    #[test]
    fn test_from_dir_rejects_garbage_font() {
        let temp = TempDir::new().unwrap();
        for weight in [FontWeight::Bold, FontWeight::Regular, FontWeight::Light] {
            fs::write(temp.path().join(weight.file_name()), b"not a font").unwrap();
        }
        assert!(FontSet::from_dir(temp.path()).is_none());
    }

    #[test]
    fn test_load_never_fails() {
        let temp = TempDir::new().unwrap();
        // Whatever the host has installed, loading degrades instead of erroring
        let _ = FontSet::load(temp.path());
    }
}
