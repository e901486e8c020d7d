//! Poster typography.
//!
//! [`TypographyProvider`] pairs the loaded [`FontSet`] with the layout
//! rules in [`layout`](fn@layout). It never fails: with no fonts available
//! the layout still resolves and the renderer skips text.

mod fonts;
mod layout;

pub use fonts::{FontSet, FontWeight};
pub use layout::{
    city_font_size, format_city_name, format_coordinates, layout, HAlign, PosterLayout, Separator,
    TextBlock, VAlign, ATTRIBUTION_TEXT, CITY_BASE_SIZE_PT, CITY_MIN_SIZE_PT, CITY_Y,
    COORDINATES_Y, COUNTRY_Y, SEPARATOR_Y,
};

use std::path::Path;
use std::sync::Arc;

use crate::coord::Coordinates;

/// Resolves display strings into a positioned layout with fonts.
#[derive(Debug, Clone)]
pub struct TypographyProvider {
    fonts: Arc<FontSet>,
}

impl TypographyProvider {
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts: Arc::new(fonts),
        }
    }

    /// Loads fonts from `fonts_dir` (see [`FontSet::load`]).
    pub fn from_dir(fonts_dir: &Path) -> Self {
        Self::new(FontSet::load(fonts_dir))
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn resolve(
        &self,
        city: &str,
        country: &str,
        country_label: Option<&str>,
        coords: &Coordinates,
    ) -> PosterLayout {
        layout(city, country, country_label, coords)
    }
}
