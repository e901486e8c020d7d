//! Overpass API data source.
//!
//! Street networks are requested as ways plus their nodes
//! (`out body; >; out skel qt;`) so intersections can be found by shared
//! node ids. Feature layers are requested with `out geom`, which inlines
//! vertex coordinates into ways and relation members.
//!
//! Several endpoints may be configured; they are tried in order until one
//! answers.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use super::assemble::{assemble_multipolygon, build_street_graph, is_closed, RawWay};
use super::types::{FeatureLayer, GeoPoint, Geometry, Polygon, StreetGraph, TagFilter};
use super::{GeoDataSource, SourceError};
use crate::coord::BoundingBox;
use crate::http::HttpClient;

/// Public Overpass endpoints, in order of preference.
pub const DEFAULT_OVERPASS_URLS: [&str; 2] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
];

/// Server-side query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 180;

/// Highway values that never represent a drivable or walkable street.
const EXCLUDED_HIGHWAYS: &str =
    "abandoned|construction|no|planned|platform|proposed|raceway|razed|bus_stop|elevator";

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    geometry: Vec<Option<OverpassLatLon>>,
    #[serde(default)]
    members: Vec<OverpassMember>,
}

#[derive(Debug, Deserialize)]
struct OverpassMember {
    #[serde(rename = "type")]
    member_type: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<Option<OverpassLatLon>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct OverpassLatLon {
    lat: f64,
    lon: f64,
}

fn vertices(geometry: &[Option<OverpassLatLon>]) -> Vec<GeoPoint> {
    geometry
        .iter()
        .flatten()
        .map(|v| GeoPoint::new(v.lat, v.lon))
        .collect()
}

fn bbox_clause(bbox: &BoundingBox) -> String {
    format!(
        "({:.6},{:.6},{:.6},{:.6})",
        bbox.south, bbox.west, bbox.north, bbox.east
    )
}

/// Query for every street-like way in the box, followed by its nodes.
pub fn graph_query(bbox: &BoundingBox, timeout_secs: u32) -> String {
    format!(
        "[out:json][timeout:{timeout_secs}];\
         way[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"{EXCLUDED_HIGHWAYS}\"]{};\
         out body;>;out skel qt;",
        bbox_clause(bbox)
    )
}

/// Query for ways and relations matching any selector of `filter`.
pub fn features_query(bbox: &BoundingBox, filter: &TagFilter, timeout_secs: u32) -> String {
    let clause = bbox_clause(bbox);
    let selectors: String = filter
        .pairs()
        .map(|(k, v)| format!("way[\"{k}\"=\"{v}\"]{clause};relation[\"{k}\"=\"{v}\"]{clause};"))
        .collect();
    format!("[out:json][timeout:{timeout_secs}];({selectors});out geom;")
}

/// Geographic data source backed by the Overpass API.
pub struct OverpassSource<C: HttpClient> {
    http_client: C,
    endpoints: Vec<String>,
    timeout_secs: u32,
}

impl<C: HttpClient> OverpassSource<C> {
    /// Creates a source using the public endpoints.
    pub fn new(http_client: C) -> Self {
        Self::with_endpoints(
            http_client,
            DEFAULT_OVERPASS_URLS.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_endpoints(http_client: C, endpoints: Vec<String>) -> Self {
        Self {
            http_client,
            endpoints,
            timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
        }
    }

    /// Sets the server-side query timeout.
    pub fn with_query_timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn run(&self, query: &str) -> Result<OverpassResponse, SourceError> {
        let mut last_error = SourceError::InvalidResponse("no Overpass endpoints configured".into());

        for url in &self.endpoints {
            debug!(url = %url, bytes = query.len(), "Overpass query");
            match self.http_client.post_form(url, &[("data", query)]) {
                Ok(body) => return parse_response(&body),
                Err(e) => {
                    warn!(url = %url, error = %e, "Overpass endpoint failed");
                    last_error = SourceError::Http(e);
                }
            }
        }

        Err(last_error)
    }
}

fn parse_response(body: &[u8]) -> Result<OverpassResponse, SourceError> {
    let response: OverpassResponse = serde_json::from_slice(body)
        .map_err(|e| SourceError::InvalidResponse(format!("invalid Overpass JSON: {e}")))?;

    // Overpass reports timeouts and memory exhaustion as a remark with a 200
    if let Some(remark) = &response.remark {
        if remark.contains("error") {
            return Err(SourceError::Remote(remark.clone()));
        }
    }
    Ok(response)
}

fn graph_from_response(response: OverpassResponse, bbox: &BoundingBox) -> StreetGraph {
    let mut coords: HashMap<i64, GeoPoint> = HashMap::new();
    let mut ways = Vec::new();

    for element in response.elements {
        match element.element_type.as_str() {
            "node" => {
                if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                    coords.insert(element.id, GeoPoint::new(lat, lon));
                }
            }
            "way" => ways.push(RawWay {
                nodes: element.nodes,
                highway: element.tags.get("highway").cloned(),
            }),
            _ => {}
        }
    }

    build_street_graph(&coords, &ways, bbox)
}

fn features_from_response(response: OverpassResponse) -> FeatureLayer {
    let mut geometries = Vec::new();

    for element in response.elements {
        match element.element_type.as_str() {
            "node" => {
                if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                    geometries.push(Geometry::Point(GeoPoint::new(lat, lon)));
                }
            }
            "way" => {
                let points = vertices(&element.geometry);
                if is_closed(&points) {
                    geometries.push(Geometry::Polygon(Polygon {
                        exterior: points,
                        holes: Vec::new(),
                    }));
                } else if points.len() >= 2 {
                    geometries.push(Geometry::LineString(points));
                }
            }
            "relation" => {
                let kind = element.tags.get("type").map(String::as_str);
                if !matches!(kind, Some("multipolygon") | Some("boundary")) {
                    continue;
                }
                let mut outers = Vec::new();
                let mut inners = Vec::new();
                for member in element.members.iter().filter(|m| m.member_type == "way") {
                    let points = vertices(&member.geometry);
                    if member.role == "inner" {
                        inners.push(points);
                    } else {
                        outers.push(points);
                    }
                }
                match assemble_multipolygon(outers, inners) {
                    Some(geometry) => geometries.push(geometry),
                    None => debug!(relation = element.id, "Relation has no closed outer ring"),
                }
            }
            _ => {}
        }
    }

    FeatureLayer::new(geometries)
}

impl<C: HttpClient> GeoDataSource for OverpassSource<C> {
    fn street_graph(&self, bbox: &BoundingBox) -> Result<StreetGraph, SourceError> {
        let response = self.run(&graph_query(bbox, self.timeout_secs))?;
        Ok(graph_from_response(response, bbox))
    }

    fn features(&self, bbox: &BoundingBox, filter: &TagFilter) -> Result<FeatureLayer, SourceError> {
        let response = self.run(&features_query(bbox, filter, self.timeout_secs))?;
        Ok(features_from_response(response))
    }

    fn name(&self) -> &str {
        "overpass"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{bounding_box, Coordinates};
    use crate::fetch::RoadClass;
    use crate::http::tests::MockHttpClient;
    use crate::http::HttpError;

    fn bbox() -> BoundingBox {
        BoundingBox {
            south: 48.8,
            west: 2.3,
            north: 48.9,
            east: 2.4,
        }
    }

    const GRAPH_RESPONSE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "way", "id": 10, "nodes": [1, 2, 3], "tags": {"highway": "primary"}},
            {"type": "way", "id": 11, "nodes": [4, 2], "tags": {"highway": "footway"}},
            {"type": "node", "id": 1, "lat": 48.85, "lon": 2.33},
            {"type": "node", "id": 2, "lat": 48.85, "lon": 2.34},
            {"type": "node", "id": 3, "lat": 48.85, "lon": 2.35},
            {"type": "node", "id": 4, "lat": 48.86, "lon": 2.34}
        ]
    }"#;

    const WATER_RESPONSE: &str = r#"{
        "elements": [
            {"type": "way", "id": 20, "tags": {"natural": "water"}, "geometry": [
                {"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0},
                {"lat": 1.0, "lon": 1.0}, {"lat": 0.0, "lon": 0.0}
            ]},
            {"type": "way", "id": 21, "tags": {"waterway": "riverbank"}, "geometry": [
                {"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0}
            ]},
            {"type": "relation", "id": 30, "tags": {"type": "multipolygon", "natural": "water"},
             "members": [
                {"type": "way", "ref": 1, "role": "outer", "geometry": [
                    {"lat": 5.0, "lon": 5.0}, {"lat": 5.0, "lon": 9.0}, {"lat": 9.0, "lon": 9.0}
                ]},
                {"type": "way", "ref": 2, "role": "outer", "geometry": [
                    {"lat": 9.0, "lon": 9.0}, {"lat": 9.0, "lon": 5.0}, {"lat": 5.0, "lon": 5.0}
                ]},
                {"type": "way", "ref": 3, "role": "inner", "geometry": [
                    {"lat": 6.0, "lon": 6.0}, {"lat": 6.0, "lon": 7.0},
                    {"lat": 7.0, "lon": 7.0}, {"lat": 6.0, "lon": 6.0}
                ]},
                {"type": "node", "ref": 4, "role": "label"}
             ]}
        ]
    }"#;

    #[test]
    fn test_graph_query_shape() {
        let query = graph_query(&bbox(), 60);
        assert!(query.starts_with("[out:json][timeout:60];"));
        assert!(query.contains("way[\"highway\"]"));
        assert!(query.contains("(48.800000,2.300000,48.900000,2.400000)"));
        assert!(query.ends_with("out body;>;out skel qt;"));
    }

    #[test]
    fn test_features_query_includes_all_selectors() {
        let query = features_query(&bbox(), &TagFilter::water(), 60);
        assert!(query.contains("way[\"natural\"=\"water\"]"));
        assert!(query.contains("relation[\"natural\"=\"water\"]"));
        assert!(query.contains("way[\"waterway\"=\"riverbank\"]"));
        assert!(query.ends_with("out geom;"));
    }

    #[test]
    fn test_street_graph_from_response() {
        let mock = MockHttpClient::ok(GRAPH_RESPONSE);
        let source = OverpassSource::with_endpoints(mock, vec!["http://overpass.test".into()]);

        let graph = source.street_graph(&bbox()).unwrap();
        // Way 10 splits at shared node 2
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(
            graph.edges.iter().filter(|e| e.class == RoadClass::Primary).count(),
            2
        );
        assert_eq!(
            graph.edges.iter().filter(|e| e.class == RoadClass::Other).count(),
            1
        );

        let requests = source.http_client.requests.lock();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].params[0].0, "data");
    }

    #[test]
    fn test_street_graph_is_clipped_to_request_bbox() {
        let center = Coordinates::new(48.8566, 2.3522).unwrap();
        let bbox = bounding_box(&center, 1000);
        let body = r#"{
            "elements": [
                {"type": "way", "id": 10, "nodes": [1, 2, 3], "tags": {"highway": "motorway"}},
                {"type": "way", "id": 11, "nodes": [4, 2], "tags": {"highway": "residential"}},
                {"type": "node", "id": 1, "lat": 48.8530, "lon": 2.3522},
                {"type": "node", "id": 2, "lat": 48.8566, "lon": 2.3522},
                {"type": "node", "id": 3, "lat": 49.3566, "lon": 2.3522},
                {"type": "node", "id": 4, "lat": 48.8566, "lon": 2.3500}
            ]
        }"#;
        let source = OverpassSource::new(MockHttpClient::ok(body));

        let graph = source.street_graph(&bbox).unwrap();
        let bounds = graph.bounds().unwrap();
        assert!(bounds.north <= bbox.north, "graph reaches {} past {}", bounds.north, bbox.north);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_features_from_response() {
        let source = OverpassSource::new(MockHttpClient::ok(WATER_RESPONSE));
        let layer = source.features(&bbox(), &TagFilter::water()).unwrap();

        // Closed way and relation kept, open way discarded
        assert_eq!(layer.len(), 2);
        let with_hole = layer
            .polygons()
            .find(|p| !p.holes.is_empty())
            .expect("relation polygon with hole");
        assert_eq!(with_hole.exterior.len(), 5);
    }

    #[test]
    fn test_falls_back_to_next_endpoint() {
        let mock = MockHttpClient::new(vec![
            Err(HttpError::Status {
                status: 504,
                url: "a".into(),
            }),
            Ok(GRAPH_RESPONSE.as_bytes().to_vec()),
        ]);
        let source =
            OverpassSource::with_endpoints(mock, vec!["http://a.test".into(), "http://b.test".into()]);

        assert!(source.street_graph(&bbox()).is_ok());
        assert_eq!(source.http_client.request_count(), 2);
    }

    #[test]
    fn test_all_endpoints_fail() {
        let mock = MockHttpClient::new(vec![Err(HttpError::Request("refused".into()))]);
        let source = OverpassSource::with_endpoints(mock, vec!["http://a.test".into()]);
        let err = source.street_graph(&bbox()).unwrap_err();
        assert!(matches!(err, SourceError::Http(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_runtime_error_remark() {
        let body = r#"{"elements": [], "remark": "runtime error: Query timed out in \"query\""}"#;
        let source = OverpassSource::new(MockHttpClient::ok(body));
        let err = source.street_graph(&bbox()).unwrap_err();
        assert!(matches!(err, SourceError::Remote(_)));
    }

    #[test]
    fn test_invalid_json() {
        let source = OverpassSource::new(MockHttpClient::ok("<html>busy</html>"));
        let err = source.features(&bbox(), &TagFilter::parks()).unwrap_err();
        assert!(matches!(err, SourceError::InvalidResponse(_)));
        assert!(!err.is_transient());
    }
}
