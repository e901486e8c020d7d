//! OSM data model: street graphs and polygon feature layers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::BoundingBox;

/// A WGS84 vertex in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Road importance, ordered from least to most important.
///
/// `Ord` follows importance, so sorting ascending yields the draw order
/// (minor roads first, motorways on top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoadClass {
    Other,
    Residential,
    Tertiary,
    Secondary,
    Primary,
    Motorway,
}

impl RoadClass {
    /// All classes in draw order.
    pub const ALL: [RoadClass; 6] = [
        RoadClass::Other,
        RoadClass::Residential,
        RoadClass::Tertiary,
        RoadClass::Secondary,
        RoadClass::Primary,
        RoadClass::Motorway,
    ];

    /// Resolves an OSM `highway` tag value.
    ///
    /// A missing tag is treated as `unclassified`, which belongs to the
    /// residential tier. Unknown values fall back to [`RoadClass::Other`].
    /// Multi-valued tags (`a;b`) use their first value.
    pub fn from_tag(highway: Option<&str>) -> Self {
        let value = highway
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("unclassified");

        match value {
            "motorway" | "motorway_link" => RoadClass::Motorway,
            "trunk" | "trunk_link" | "primary" | "primary_link" => RoadClass::Primary,
            "secondary" | "secondary_link" => RoadClass::Secondary,
            "tertiary" | "tertiary_link" => RoadClass::Tertiary,
            "residential" | "living_street" | "unclassified" => RoadClass::Residential,
            _ => RoadClass::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoadClass::Motorway => "motorway",
            RoadClass::Primary => "primary",
            RoadClass::Secondary => "secondary",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Other => "other",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intersection or dead end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub osm_id: i64,
    pub point: GeoPoint,
}

/// Road segment between two graph nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Index into [`StreetGraph::nodes`].
    pub from: usize,
    /// Index into [`StreetGraph::nodes`].
    pub to: usize,
    pub class: RoadClass,
    /// Full polyline including both end nodes.
    pub geometry: Vec<GeoPoint>,
}

/// Street network with edges split at intersections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl StreetGraph {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Bounds of all nodes, or `None` for an empty graph.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut iter = self.nodes.iter().map(|n| n.point);
        let first = iter.next()?;
        let init = BoundingBox {
            south: first.lat,
            west: first.lon,
            north: first.lat,
            east: first.lon,
        };
        Some(iter.fold(init, |b, p| BoundingBox {
            south: b.south.min(p.lat),
            west: b.west.min(p.lon),
            north: b.north.max(p.lat),
            east: b.east.max(p.lon),
        }))
    }

    /// Edges sorted for drawing: least important class first.
    pub fn edges_in_draw_order(&self) -> Vec<&GraphEdge> {
        let mut edges: Vec<&GraphEdge> = self.edges.iter().collect();
        edges.sort_by_key(|e| e.class);
        edges
    }
}

/// Closed ring of vertices; the last vertex repeats the first.
pub type Ring = Vec<GeoPoint>;

/// Polygon with an outer boundary and optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// Geometry as produced by a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(GeoPoint),
    LineString(Vec<GeoPoint>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn is_areal(&self) -> bool {
        matches!(self, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
    }
}

/// Unordered set of polygonal features (water bodies, parks).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayer {
    geometries: Vec<Geometry>,
}

impl FeatureLayer {
    /// Builds a layer, discarding points and line strings.
    pub fn new(geometries: impl IntoIterator<Item = Geometry>) -> Self {
        Self {
            geometries: geometries.into_iter().filter(Geometry::is_areal).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Iterates every polygon, flattening multipolygons.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.geometries.iter().flat_map(|g| match g {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(ps) => ps.as_slice(),
            Geometry::Point(_) | Geometry::LineString(_) => &[][..],
        })
    }
}

/// OSM tag selector for a feature layer.
///
/// An element matches when any `(key, value)` pair matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    name: String,
    tags: BTreeMap<String, Vec<String>>,
}

impl TagFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Adds a `key=value` selector.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        let values = self.tags.entry(key.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
            values.sort();
        }
        self
    }

    /// Water bodies: `natural=water`, `waterway=riverbank`.
    pub fn water() -> Self {
        Self::new("water")
            .with("natural", "water")
            .with("waterway", "riverbank")
    }

    /// Green space: `leisure=park`, `landuse=grass`.
    pub fn parks() -> Self {
        Self::new("parks")
            .with("leisure", "park")
            .with("landuse", "grass")
    }

    /// Layer name used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flattened `(key, value)` pairs in sorted order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Order-independent identity of the selector set, e.g.
    /// `natural=water;waterway=riverbank`.
    pub fn identity(&self) -> String {
        self.pairs()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Everything needed to draw one poster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    pub graph: StreetGraph,
    pub water: FeatureLayer,
    pub parks: FeatureLayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_class_mapping() {
        let cases = [
            ("motorway", RoadClass::Motorway),
            ("motorway_link", RoadClass::Motorway),
            ("trunk", RoadClass::Primary),
            ("trunk_link", RoadClass::Primary),
            ("primary", RoadClass::Primary),
            ("primary_link", RoadClass::Primary),
            ("secondary", RoadClass::Secondary),
            ("secondary_link", RoadClass::Secondary),
            ("tertiary", RoadClass::Tertiary),
            ("tertiary_link", RoadClass::Tertiary),
            ("residential", RoadClass::Residential),
            ("living_street", RoadClass::Residential),
            ("unclassified", RoadClass::Residential),
            ("footway", RoadClass::Other),
            ("service", RoadClass::Other),
            ("cycleway", RoadClass::Other),
        ];
        for (tag, expected) in cases {
            assert_eq!(RoadClass::from_tag(Some(tag)), expected, "tag {tag}");
        }
    }

    #[test]
    fn test_missing_tag_is_residential() {
        assert_eq!(RoadClass::from_tag(None), RoadClass::Residential);
        assert_eq!(RoadClass::from_tag(Some("")), RoadClass::Residential);
    }

    #[test]
    fn test_multi_valued_tag_uses_first() {
        assert_eq!(
            RoadClass::from_tag(Some("primary;secondary")),
            RoadClass::Primary
        );
    }

    #[test]
    fn test_road_class_ordering() {
        assert!(RoadClass::Motorway > RoadClass::Primary);
        assert!(RoadClass::Primary > RoadClass::Secondary);
        assert!(RoadClass::Secondary > RoadClass::Tertiary);
        assert!(RoadClass::Tertiary > RoadClass::Residential);
        assert!(RoadClass::Residential > RoadClass::Other);

        let mut sorted = RoadClass::ALL;
        sorted.sort();
        assert_eq!(sorted, RoadClass::ALL);
    }

    #[test]
    fn test_feature_layer_discards_non_polygons() {
        let square = Polygon {
            exterior: vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(0.0, 1.0),
                GeoPoint::new(1.0, 1.0),
                GeoPoint::new(0.0, 0.0),
            ],
            holes: vec![],
        };
        let layer = FeatureLayer::new(vec![
            Geometry::Point(GeoPoint::new(0.0, 0.0)),
            Geometry::LineString(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)]),
            Geometry::Polygon(square.clone()),
            Geometry::MultiPolygon(vec![square.clone(), square]),
        ]);

        assert_eq!(layer.len(), 2);
        assert_eq!(layer.polygons().count(), 3);
    }

    #[test]
    fn test_tag_filter_identity_is_order_independent() {
        let a = TagFilter::new("x").with("b", "2").with("a", "1").with("a", "0");
        let b = TagFilter::new("y").with("a", "0").with("a", "1").with("b", "2");
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a.identity(), "a=0;a=1;b=2");
    }

    #[test]
    fn test_builtin_filters() {
        assert_eq!(TagFilter::water().identity(), "natural=water;waterway=riverbank");
        assert_eq!(TagFilter::parks().identity(), "landuse=grass;leisure=park");
        assert_eq!(TagFilter::parks().name(), "parks");
    }

    #[test]
    fn test_graph_bounds_and_draw_order() {
        let graph = StreetGraph {
            nodes: vec![
                GraphNode {
                    osm_id: 1,
                    point: GeoPoint::new(48.85, 2.35),
                },
                GraphNode {
                    osm_id: 2,
                    point: GeoPoint::new(48.86, 2.34),
                },
            ],
            edges: vec![
                GraphEdge {
                    from: 0,
                    to: 1,
                    class: RoadClass::Motorway,
                    geometry: vec![],
                },
                GraphEdge {
                    from: 1,
                    to: 0,
                    class: RoadClass::Other,
                    geometry: vec![],
                },
            ],
        };

        let bounds = graph.bounds().unwrap();
        assert_eq!(bounds.south, 48.85);
        assert_eq!(bounds.north, 48.86);
        assert_eq!(bounds.west, 2.34);
        assert_eq!(bounds.east, 2.35);

        let order: Vec<_> = graph.edges_in_draw_order().iter().map(|e| e.class).collect();
        assert_eq!(order, vec![RoadClass::Other, RoadClass::Motorway]);
        assert!(StreetGraph::default().bounds().is_none());
    }
}
