//! tiny-skia drawing primitives for poster layers.

use tiny_skia::{
    Color as SkColor, FillRule, GradientStop, LineCap, LineJoin, LinearGradient, Paint,
    PathBuilder, Pixmap, Point, Rect, Shader, SpreadMode, Stroke, Transform,
};

use crate::fetch::{GeoPoint, Polygon};
use crate::theme::Color;

use super::viewport::Viewport;

/// Share of the canvas height covered by each gradient fade.
pub const GRADIENT_FRACTION: f32 = 0.25;

pub fn sk_color(color: Color, alpha: f32) -> SkColor {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    SkColor::from_rgba8(color.r, color.g, color.b, a)
}

pub fn solid_paint(color: Color, alpha: f32) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(sk_color(color, alpha)),
        anti_alias: true,
        ..Default::default()
    }
}

fn push_ring(pb: &mut PathBuilder, ring: &[GeoPoint], viewport: &Viewport) {
    let mut points = ring.iter().map(|p| viewport.geo_to_pixel(*p));
    if let Some((x, y)) = points.next() {
        pb.move_to(x, y);
        for (x, y) in points {
            pb.line_to(x, y);
        }
        pb.close();
    }
}

/// Fills a polygon with its holes using the even-odd rule.
pub fn fill_polygon(pixmap: &mut Pixmap, polygon: &Polygon, viewport: &Viewport, paint: &Paint) {
    if polygon.exterior.len() < 3 {
        return;
    }
    let mut pb = PathBuilder::new();
    push_ring(&mut pb, &polygon.exterior, viewport);
    for hole in polygon.holes.iter().filter(|h| h.len() >= 3) {
        push_ring(&mut pb, hole, viewport);
    }
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, paint, FillRule::EvenOdd, Transform::identity(), None);
    }
}

/// Strokes a set of polylines as one path.
pub fn stroke_polylines<'a>(
    pixmap: &mut Pixmap,
    lines: impl IntoIterator<Item = &'a [GeoPoint]>,
    viewport: &Viewport,
    paint: &Paint,
    width_px: f32,
) {
    let mut pb = PathBuilder::new();
    for line in lines {
        let mut points = line.iter().map(|p| viewport.geo_to_pixel(*p));
        let Some((x, y)) = points.next() else {
            continue;
        };
        pb.move_to(x, y);
        for (x, y) in points {
            pb.line_to(x, y);
        }
    }
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width: width_px,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}

/// Straight line between two pixel positions.
pub fn stroke_segment(
    pixmap: &mut Pixmap,
    from: (f32, f32),
    to: (f32, f32),
    paint: &Paint,
    width_px: f32,
) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: width_px,
            ..Default::default()
        };
        pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
    }
}

/// Which canvas edge a gradient fade starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEdge {
    Top,
    Bottom,
}

/// Fades from opaque `color` at `edge` to transparent over
/// [`GRADIENT_FRACTION`] of the canvas height.
pub fn draw_fade(pixmap: &mut Pixmap, color: Color, edge: FadeEdge) {
    let width = pixmap.width() as f32;
    let height = pixmap.height() as f32;
    let band = height * GRADIENT_FRACTION;

    let (opaque_y, clear_y, top) = match edge {
        FadeEdge::Bottom => (height, height - band, height - band),
        FadeEdge::Top => (0.0, band, 0.0),
    };

    let shader = LinearGradient::new(
        Point::from_xy(0.0, opaque_y),
        Point::from_xy(0.0, clear_y),
        vec![
            GradientStop::new(0.0, sk_color(color, 1.0)),
            GradientStop::new(1.0, sk_color(color, 0.0)),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    );
    let (Some(shader), Some(rect)) = (shader, Rect::from_xywh(0.0, top, width, band)) else {
        return;
    };
    let paint = Paint {
        shader,
        anti_alias: false,
        ..Default::default()
    };
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let p = pixmap.pixel(x, y).unwrap().demultiply();
        (p.red(), p.green(), p.blue(), p.alpha())
    }

    #[test]
    fn test_fade_is_opaque_at_edges_and_clear_in_middle() {
        let mut pixmap = Pixmap::new(10, 100).unwrap();
        pixmap.fill(SkColor::from_rgba8(255, 255, 255, 255));
        draw_fade(&mut pixmap, Color::rgb(0, 0, 0), FadeEdge::Bottom);
        draw_fade(&mut pixmap, Color::rgb(0, 0, 0), FadeEdge::Top);

        let (r, ..) = pixel(&pixmap, 5, 99);
        assert!(r < 10, "bottom edge should be nearly gradient color, got {r}");
        let (r, ..) = pixel(&pixmap, 5, 0);
        assert!(r < 10, "top edge should be nearly gradient color, got {r}");
        assert_eq!(pixel(&pixmap, 5, 50), (255, 255, 255, 255));
    }

    #[test]
    fn test_fill_polygon_respects_holes() {
        let viewport = Viewport {
            min_x: 0.0,
            max_x: 100.0,
            min_y: 0.0,
            max_y: 100.0,
            width_px: 100,
            height_px: 100,
        };
        // Square in projected meters around the origin, expressed in degrees
        let deg = |x: f64, y: f64| {
            let (lat, lon) = crate::coord::unproject(crate::coord::ProjectedPoint { x, y });
            GeoPoint::new(lat, lon)
        };
        let ring = |a: f64, b: f64| vec![deg(a, a), deg(b, a), deg(b, b), deg(a, b), deg(a, a)];
        let polygon = Polygon {
            exterior: ring(10.0, 90.0),
            holes: vec![ring(40.0, 60.0)],
        };

        let mut pixmap = Pixmap::new(100, 100).unwrap();
        pixmap.fill(SkColor::from_rgba8(0, 0, 0, 255));
        fill_polygon(&mut pixmap, &polygon, &viewport, &solid_paint(Color::WHITE, 1.0));

        assert_eq!(pixel(&pixmap, 20, 20).0, 255);
        assert_eq!(pixel(&pixmap, 50, 50).0, 0);
        assert_eq!(pixel(&pixmap, 2, 2).0, 0);
    }

    #[test]
    fn test_sk_color_alpha() {
        let c = sk_color(Color::rgb(10, 20, 30), 0.5);
        assert!((c.alpha() - 128.0 / 255.0).abs() < 1e-6);
    }
}
