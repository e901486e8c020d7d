//! Text content, sizes and placement of poster typography.
//!
//! Positions are fractions of the poster size, measured from the bottom
//! left corner. Sizes are in points.

use crate::coord::Coordinates;

use super::fonts::FontWeight;

/// City name size for names of up to [`CITY_SCALE_THRESHOLD`] characters.
pub const CITY_BASE_SIZE_PT: f32 = 60.0;
/// Smallest city name size.
pub const CITY_MIN_SIZE_PT: f32 = 24.0;
/// Character count above which the city name shrinks.
pub const CITY_SCALE_THRESHOLD: usize = 10;

pub const COUNTRY_SIZE_PT: f32 = 22.0;
pub const COORDINATES_SIZE_PT: f32 = 14.0;
pub const ATTRIBUTION_SIZE_PT: f32 = 8.0;

pub const CITY_Y: f32 = 0.14;
pub const SEPARATOR_Y: f32 = 0.125;
pub const SEPARATOR_X: (f32, f32) = (0.4, 0.6);
pub const SEPARATOR_WIDTH_PT: f32 = 1.0;
pub const COUNTRY_Y: f32 = 0.10;
pub const COORDINATES_Y: f32 = 0.07;
pub const ATTRIBUTION_X: f32 = 0.98;
pub const ATTRIBUTION_Y: f32 = 0.02;

pub const COORDINATES_ALPHA: f32 = 0.7;
pub const ATTRIBUTION_ALPHA: f32 = 0.5;

pub const ATTRIBUTION_TEXT: &str = "© OpenStreetMap contributors";

/// Horizontal anchor of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    /// `x` is the horizontal center of the text.
    Center,
    /// `x` is the right edge of the text.
    Right,
}

/// Vertical anchor of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    /// `y` is the text baseline.
    Baseline,
    /// `y` is the bottom of the text's descent.
    Bottom,
}

/// One line of poster text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub weight: FontWeight,
    pub size_pt: f32,
    pub x: f32,
    pub y: f32,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub alpha: f32,
}

/// Horizontal rule between the city and country names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separator {
    pub x_start: f32,
    pub x_end: f32,
    pub y: f32,
    pub width_pt: f32,
}

/// All typography of one poster, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct PosterLayout {
    pub city: TextBlock,
    pub separator: Separator,
    pub country: TextBlock,
    pub coordinates: TextBlock,
    pub attribution: TextBlock,
}

impl PosterLayout {
    /// Text blocks in draw order.
    pub fn text_blocks(&self) -> [&TextBlock; 4] {
        [&self.city, &self.country, &self.coordinates, &self.attribution]
    }
}

/// City name size: the base size, scaled down by `10 / chars` for long
/// names and never below [`CITY_MIN_SIZE_PT`].
pub fn city_font_size(city: &str) -> f32 {
    let chars = city.chars().count();
    if chars > CITY_SCALE_THRESHOLD {
        let scaled = CITY_BASE_SIZE_PT * CITY_SCALE_THRESHOLD as f32 / chars as f32;
        scaled.max(CITY_MIN_SIZE_PT)
    } else {
        CITY_BASE_SIZE_PT
    }
}

/// Uppercases and letter-spaces a city name: `Paris` → `P  A  R  I  S`.
pub fn format_city_name(city: &str) -> String {
    city.to_uppercase()
        .chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join("  ")
}

/// `48.8566° N / 2.3522° E`
pub fn format_coordinates(coords: &Coordinates) -> String {
    let (lat, lon) = (coords.latitude(), coords.longitude());
    let lat_dir = if lat >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if lon >= 0.0 { 'E' } else { 'W' };
    format!(
        "{:.4}° {} / {:.4}° {}",
        lat.abs(),
        lat_dir,
        lon.abs(),
        lon_dir
    )
}

/// Lays out the poster text for a place.
///
/// `country_label`, when given, replaces the country name on the poster.
pub fn layout(
    city: &str,
    country: &str,
    country_label: Option<&str>,
    coords: &Coordinates,
) -> PosterLayout {
    let country_text = country_label
        .filter(|label| !label.trim().is_empty())
        .unwrap_or(country);

    let centered = |text: String, weight, size_pt, y, alpha| TextBlock {
        text,
        weight,
        size_pt,
        x: 0.5,
        y,
        h_align: HAlign::Center,
        v_align: VAlign::Baseline,
        alpha,
    };

    PosterLayout {
        city: centered(
            format_city_name(city),
            FontWeight::Bold,
            city_font_size(city),
            CITY_Y,
            1.0,
        ),
        separator: Separator {
            x_start: SEPARATOR_X.0,
            x_end: SEPARATOR_X.1,
            y: SEPARATOR_Y,
            width_pt: SEPARATOR_WIDTH_PT,
        },
        country: centered(
            country_text.to_uppercase(),
            FontWeight::Light,
            COUNTRY_SIZE_PT,
            COUNTRY_Y,
            1.0,
        ),
        coordinates: centered(
            format_coordinates(coords),
            FontWeight::Regular,
            COORDINATES_SIZE_PT,
            COORDINATES_Y,
            COORDINATES_ALPHA,
        ),
        attribution: TextBlock {
            text: ATTRIBUTION_TEXT.to_string(),
            weight: FontWeight::Light,
            size_pt: ATTRIBUTION_SIZE_PT,
            x: ATTRIBUTION_X,
            y: ATTRIBUTION_Y,
            h_align: HAlign::Right,
            v_align: VAlign::Bottom,
            alpha: ATTRIBUTION_ALPHA,
        },
    }
}
