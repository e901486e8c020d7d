//! Mapping from geographic coordinates to canvas pixels.

use crate::coord::{project, ProjectedPoint};
use crate::fetch::{GeoPoint, StreetGraph};

use super::RenderError;

/// Visible Web Mercator extent and the canvas it maps onto.
///
/// Pixel y grows downwards; projected y grows northwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub width_px: u32,
    pub height_px: u32,
}

impl Viewport {
    /// Fits the street graph's node extent to the canvas.
    ///
    /// The extent is cropped around its center so its aspect ratio matches
    /// the canvas: a too-wide extent loses its sides, a too-tall one its top
    /// and bottom. A graph whose nodes collapse onto a line is widened along
    /// the degenerate axis instead.
    pub fn fit(graph: &StreetGraph, width_px: u32, height_px: u32) -> Result<Self, RenderError> {
        if width_px == 0 || height_px == 0 {
            return Err(RenderError::InvalidCanvas {
                width: width_px,
                height: height_px,
            });
        }
        let bounds = graph.bounds().ok_or(RenderError::EmptyExtent)?;
        let sw = project(bounds.south, bounds.west);
        let ne = project(bounds.north, bounds.east);
        Self::crop(sw, ne, width_px, height_px)
    }

    fn crop(
        sw: ProjectedPoint,
        ne: ProjectedPoint,
        width_px: u32,
        height_px: u32,
    ) -> Result<Self, RenderError> {
        let x_range = ne.x - sw.x;
        let y_range = ne.y - sw.y;
        if !(x_range > 0.0 || y_range > 0.0) {
            return Err(RenderError::EmptyExtent);
        }

        let desired_aspect = width_px as f64 / height_px as f64;
        let center_x = (sw.x + ne.x) / 2.0;
        let center_y = (sw.y + ne.y) / 2.0;

        let (x_span, y_span) = if y_range <= 0.0 {
            (x_range, x_range / desired_aspect)
        } else if x_range <= 0.0 {
            (y_range * desired_aspect, y_range)
        } else {
            let current_aspect = x_range / y_range;
            if current_aspect > desired_aspect {
                (y_range * desired_aspect, y_range)
            } else if current_aspect < desired_aspect {
                (x_range, x_range / desired_aspect)
            } else {
                (x_range, y_range)
            }
        };

        Ok(Self {
            min_x: center_x - x_span / 2.0,
            max_x: center_x + x_span / 2.0,
            min_y: center_y - y_span / 2.0,
            max_y: center_y + y_span / 2.0,
            width_px,
            height_px,
        })
    }

    pub fn aspect(&self) -> f64 {
        (self.max_x - self.min_x) / (self.max_y - self.min_y)
    }

    /// Pixel position of a projected point.
    pub fn to_pixel(&self, p: ProjectedPoint) -> (f32, f32) {
        let fx = (p.x - self.min_x) / (self.max_x - self.min_x);
        let fy = (self.max_y - p.y) / (self.max_y - self.min_y);
        (
            (fx * self.width_px as f64) as f32,
            (fy * self.height_px as f64) as f32,
        )
    }

    /// Pixel position of a geographic point.
    pub fn geo_to_pixel(&self, p: GeoPoint) -> (f32, f32) {
        self.to_pixel(project(p.lat, p.lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{GraphEdge, GraphNode, RoadClass};

    fn graph(points: &[(f64, f64)]) -> StreetGraph {
        let nodes: Vec<GraphNode> = points
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| GraphNode {
                osm_id: i as i64,
                point: GeoPoint::new(lat, lon),
            })
            .collect();
        let edges = (1..nodes.len())
            .map(|i| GraphEdge {
                from: i - 1,
                to: i,
                class: RoadClass::Residential,
                geometry: vec![nodes[i - 1].point, nodes[i].point],
            })
            .collect();
        StreetGraph { nodes, edges }
    }

    fn projected(x: f64, y: f64) -> ProjectedPoint {
        ProjectedPoint { x, y }
    }

    #[test]
    fn test_too_wide_extent_crops_horizontally() {
        let vp = Viewport::crop(projected(0.0, 0.0), projected(400.0, 100.0), 300, 400).unwrap();
        assert_eq!((vp.min_y, vp.max_y), (0.0, 100.0));
        assert!((vp.max_x - vp.min_x - 75.0).abs() < 1e-9);
        assert!((vp.min_x + vp.max_x - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_tall_extent_crops_vertically() {
        let vp = Viewport::crop(projected(0.0, 0.0), projected(300.0, 1000.0), 300, 400).unwrap();
        assert_eq!((vp.min_x, vp.max_x), (0.0, 300.0));
        assert!((vp.max_y - vp.min_y - 400.0).abs() < 1e-9);
        assert!((vp.aspect() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_matching_aspect_is_unchanged() {
        let vp = Viewport::crop(projected(10.0, 20.0), projected(40.0, 60.0), 300, 400).unwrap();
        assert_eq!((vp.min_x, vp.max_x, vp.min_y, vp.max_y), (10.0, 40.0, 20.0, 60.0));
    }

    #[test]
    fn test_single_point_is_empty_extent() {
        let g = graph(&[(48.0, 2.0), (48.0, 2.0)]);
        assert!(matches!(Viewport::fit(&g, 30, 40), Err(RenderError::EmptyExtent)));
        assert!(matches!(
            Viewport::fit(&StreetGraph::default(), 30, 40),
            Err(RenderError::EmptyExtent)
        ));
    }

    #[test]
    fn test_horizontal_line_is_widened() {
        let g = graph(&[(48.0, 2.0), (48.0, 2.1)]);
        let vp = Viewport::fit(&g, 300, 400).unwrap();
        assert!(vp.max_y > vp.min_y);
        assert!((vp.aspect() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_to_pixel_flips_y() {
        let vp = Viewport::crop(projected(0.0, 0.0), projected(300.0, 400.0), 300, 400).unwrap();
        assert_eq!(vp.to_pixel(projected(0.0, 400.0)), (0.0, 0.0));
        assert_eq!(vp.to_pixel(projected(300.0, 0.0)), (300.0, 400.0));
        assert_eq!(vp.to_pixel(projected(150.0, 200.0)), (150.0, 200.0));
    }

    #[test]
    fn test_zero_canvas_rejected() {
        let g = graph(&[(48.0, 2.0), (48.1, 2.1)]);
        assert!(matches!(
            Viewport::fit(&g, 0, 10),
            Err(RenderError::InvalidCanvas { .. })
        ));
    }
}
