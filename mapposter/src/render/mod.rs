//! Poster rendering.
//!
//! [`PosterRenderer`] composites the fetched layers onto a raster canvas in a
//! fixed order:
//!
//! | z | layer |
//! |---|-------|
//! | 0 | background |
//! | 1 | water |
//! | 2 | parks |
//! | 3 | roads, least important class first |
//! | 10 | top and bottom gradient fades |
//! | 11 | city, separator, country, coordinates, attribution |
//!
//! Rendering is deterministic: the same request always encodes to the same
//! bytes.

mod canvas;
mod style;
mod text;
mod viewport;

pub use canvas::{FadeEdge, GRADIENT_FRACTION};
pub use style::{road_style, road_width_pt, RoadStyle};
pub use text::{measure, pt_to_px};
pub use viewport::Viewport;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use thiserror::Error;
use tiny_skia::{Pixmap, PremultipliedColorU8};
use tracing::{debug, info, warn};

use crate::coord::Coordinates;
use crate::fetch::{GeoPoint, MapData, RoadClass};
use crate::theme::Theme;
use crate::typography::{PosterLayout, TextBlock, TypographyProvider};

/// Default poster width in inches.
pub const DEFAULT_WIDTH_IN: f32 = 12.0;
/// Default poster height in inches.
pub const DEFAULT_HEIGHT_IN: f32 = 16.0;
/// Default raster resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Errors from rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported output format '{0}' (expected png or jpeg)")]
    UnsupportedFormat(String),

    #[error("Street graph has no drawable extent")]
    EmptyExtent,

    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raster output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Physical poster size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    pub width_in: f32,
    pub height_in: f32,
    pub dpi: u32,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width_in: DEFAULT_WIDTH_IN,
            height_in: DEFAULT_HEIGHT_IN,
            dpi: DEFAULT_DPI,
        }
    }
}

impl CanvasSpec {
    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f32| (inches * self.dpi as f32).round().max(0.0) as u32;
        (px(self.width_in), px(self.height_in))
    }
}

/// Everything needed to draw and write one poster.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Layers, shared between the renders of a multi-theme batch.
    pub data: Arc<MapData>,
    pub city: String,
    pub country: String,
    pub coordinates: Coordinates,
    /// Replaces the country name on the poster when set.
    pub country_label: Option<String>,
    pub theme: Theme,
    pub output_path: PathBuf,
    pub format: OutputFormat,
}

/// Draws a poster and writes it to the request's output path.
pub trait Renderer: Send + Sync {
    fn render(&self, request: RenderRequest) -> Result<(), RenderError>;
}

/// Raster renderer backed by tiny-skia.
#[derive(Debug, Clone)]
pub struct PosterRenderer {
    typography: TypographyProvider,
    canvas: CanvasSpec,
}

impl PosterRenderer {
    pub fn new(typography: TypographyProvider, canvas: CanvasSpec) -> Self {
        Self { typography, canvas }
    }

    pub fn canvas(&self) -> CanvasSpec {
        self.canvas
    }

    /// Typography for a request, as it will be drawn.
    pub fn layout_for(&self, request: &RenderRequest) -> PosterLayout {
        self.typography.resolve(
            &request.city,
            &request.country,
            request.country_label.as_deref(),
            &request.coordinates,
        )
    }

    /// Draws all layers onto a fresh canvas.
    pub fn compose(&self, request: &RenderRequest) -> Result<Pixmap, RenderError> {
        let (width, height) = self.canvas.pixel_size();
        let viewport = Viewport::fit(&request.data.graph, width, height)?;
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidCanvas { width, height })?;
        let theme = &request.theme;
        let dpi = self.canvas.dpi;

        pixmap.fill(canvas::sk_color(theme.bg, 1.0));

        let water = canvas::solid_paint(theme.water, 1.0);
        for polygon in request.data.water.polygons() {
            canvas::fill_polygon(&mut pixmap, polygon, &viewport, &water);
        }
        let parks = canvas::solid_paint(theme.parks, 1.0);
        for polygon in request.data.parks.polygons() {
            canvas::fill_polygon(&mut pixmap, polygon, &viewport, &parks);
        }

        let mut by_class: BTreeMap<RoadClass, Vec<&[GeoPoint]>> = BTreeMap::new();
        for edge in request.data.graph.edges_in_draw_order() {
            by_class.entry(edge.class).or_default().push(&edge.geometry);
        }
        for (class, lines) in by_class {
            let style = road_style(theme, class);
            debug!(class = %class, edges = lines.len(), "Drawing roads");
            canvas::stroke_polylines(
                &mut pixmap,
                lines,
                &viewport,
                &canvas::solid_paint(style.color, 1.0),
                pt_to_px(style.width_pt, dpi),
            );
        }

        canvas::draw_fade(&mut pixmap, theme.gradient_color, FadeEdge::Bottom);
        canvas::draw_fade(&mut pixmap, theme.gradient_color, FadeEdge::Top);

        self.draw_typography(&mut pixmap, &self.layout_for(request), theme);

        Ok(pixmap)
    }

    fn draw_typography(&self, pixmap: &mut Pixmap, layout: &PosterLayout, theme: &Theme) {
        let dpi = self.canvas.dpi;
        let fonts = self.typography.fonts();
        let mut skipped = 0;
        let mut draw = |pixmap: &mut Pixmap, block: &TextBlock| match fonts.font(block.weight) {
            Some(font) => text::draw_text(pixmap, font, block, theme.text, dpi),
            None => skipped += 1,
        };

        draw(pixmap, &layout.city);

        let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
        let sep = &layout.separator;
        let y = (1.0 - sep.y) * h;
        canvas::stroke_segment(
            pixmap,
            (sep.x_start * w, y),
            (sep.x_end * w, y),
            &canvas::solid_paint(theme.text, 1.0),
            pt_to_px(sep.width_pt, dpi),
        );

        draw(pixmap, &layout.country);
        draw(pixmap, &layout.coordinates);
        draw(pixmap, &layout.attribution);

        if skipped > 0 {
            warn!(skipped, "Fonts unavailable, poster text omitted");
        }
    }

    /// Encodes a composed canvas.
    ///
    /// The pixmap is consumed and its buffer demultiplied and, for JPEG,
    /// packed to RGB in place, so only one full-size buffer is alive while
    /// encoding.
    pub fn encode(pixmap: Pixmap, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let mut data = pixmap.take();
        for px in data.chunks_exact_mut(4) {
            if let Some(c) = PremultipliedColorU8::from_rgba(px[0], px[1], px[2], px[3]) {
                let c = c.demultiply();
                px.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
            }
        }

        let image = match format {
            OutputFormat::Png => {
                RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8)
            }
            OutputFormat::Jpeg => {
                let pixels = data.len() / 4;
                for i in 0..pixels {
                    data.copy_within(i * 4..i * 4 + 3, i * 3);
                }
                data.truncate(pixels * 3);
                RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
            }
        }
        .ok_or(RenderError::InvalidCanvas { width, height })?;

        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
        Ok(bytes)
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let io_err = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, bytes).map_err(io_err)
}

impl Renderer for PosterRenderer {
    fn render(&self, request: RenderRequest) -> Result<(), RenderError> {
        let (width, height) = self.canvas.pixel_size();
        info!(
            city = %request.city,
            theme = %request.theme.name,
            width,
            height,
            format = %request.format,
            "Rendering poster"
        );

        let pixmap = self.compose(&request)?;
        let bytes = Self::encode(pixmap, request.format)?;
        write_output(&request.output_path, &bytes)?;

        info!(path = %request.output_path.display(), bytes = bytes.len(), "Poster saved");
        Ok(())
    }
}
