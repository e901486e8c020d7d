//! Assembly of raw OSM elements into graphs and polygons.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::coord::BoundingBox;

use super::types::{
    GeoPoint, Geometry, GraphEdge, GraphNode, Polygon, Ring, RoadClass, StreetGraph,
};

/// A highway way as listed by the data source.
#[derive(Debug, Clone)]
pub(crate) struct RawWay {
    pub nodes: Vec<i64>,
    pub highway: Option<String>,
}

/// Builds a street graph, splitting ways wherever they share a node.
///
/// Graph nodes are way end points and nodes referenced more than once.
/// Node references without coordinates are skipped. Vertices outside `bbox`
/// are dropped and cut their way in two, so the graph never reaches past
/// the requested area.
pub(crate) fn build_street_graph(
    coords: &HashMap<i64, GeoPoint>,
    ways: &[RawWay],
    bbox: &BoundingBox,
) -> StreetGraph {
    let mut references: HashMap<i64, u32> = HashMap::new();
    for way in ways {
        for id in &way.nodes {
            *references.entry(*id).or_default() += 1;
        }
    }

    let mut graph = StreetGraph::default();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut node_index = |graph: &mut StreetGraph, id: i64, point: GeoPoint| -> usize {
        *index.entry(id).or_insert_with(|| {
            graph.nodes.push(GraphNode { osm_id: id, point });
            graph.nodes.len() - 1
        })
    };

    let mut truncated = 0usize;
    for way in ways {
        let mut resolved: Vec<(i64, GeoPoint)> = Vec::with_capacity(way.nodes.len());
        for id in &way.nodes {
            let Some(point) = coords.get(id) else {
                continue;
            };
            if resolved.last().map(|(prev, _)| prev) != Some(id) {
                resolved.push((*id, *point));
            }
        }

        let class = RoadClass::from_tag(way.highway.as_deref());
        let runs: Vec<&[(i64, GeoPoint)]> = resolved
            .split(|(_, p)| !bbox.contains(p.lat, p.lon))
            .filter(|run| !run.is_empty())
            .collect();
        if runs.iter().map(|run| run.len()).sum::<usize>() < resolved.len() {
            truncated += 1;
        }

        for run in runs.into_iter().filter(|run| run.len() >= 2) {
            let last = run.len() - 1;
            let (start_id, start_point) = run[0];
            let mut from = node_index(&mut graph, start_id, start_point);
            let mut geometry = vec![start_point];

            for (i, (id, point)) in run.iter().enumerate().skip(1) {
                geometry.push(*point);
                let is_junction = references.get(id).copied().unwrap_or(0) > 1;
                if i == last || is_junction {
                    let to = node_index(&mut graph, *id, *point);
                    graph.edges.push(GraphEdge {
                        from,
                        to,
                        class,
                        geometry: std::mem::replace(&mut geometry, vec![*point]),
                    });
                    from = to;
                }
            }
        }
    }

    if truncated > 0 {
        debug!(ways = truncated, "Truncated ways at the bounding box");
    }
    graph
}

/// A ring is closed when it has at least three distinct vertices and its
/// last vertex repeats the first.
pub(crate) fn is_closed(points: &[GeoPoint]) -> bool {
    points.len() >= 4 && points.first() == points.last()
}

/// Joins way segments end to end into closed rings.
///
/// Segments may be reversed to fit. Chains that never close are dropped.
pub(crate) fn stitch_rings(segments: Vec<Vec<GeoPoint>>) -> Vec<Ring> {
    let mut pending: VecDeque<Vec<GeoPoint>> =
        segments.into_iter().filter(|s| s.len() >= 2).collect();
    let mut rings = Vec::new();

    while let Some(mut current) = pending.pop_front() {
        loop {
            if is_closed(&current) {
                rings.push(current);
                break;
            }
            let Some(&end) = current.last() else {
                break;
            };
            let next = pending
                .iter()
                .position(|s| s.first() == Some(&end) || s.last() == Some(&end))
                .and_then(|i| pending.remove(i));
            let Some(mut next) = next else {
                debug!(vertices = current.len(), "Dropping unclosed ring");
                break;
            };
            if next.first() != Some(&end) {
                next.reverse();
            }
            current.extend(next.into_iter().skip(1));
        }
    }

    rings
}

/// Even-odd point-in-ring test in lat/lon space.
pub(crate) fn point_in_ring(point: GeoPoint, ring: &[GeoPoint]) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat)
            && point.lon < (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Builds a (multi)polygon from multipolygon relation members.
///
/// Inner rings become holes of the first outer ring containing them;
/// orphaned inner rings are discarded.
pub(crate) fn assemble_multipolygon(
    outer_segments: Vec<Vec<GeoPoint>>,
    inner_segments: Vec<Vec<GeoPoint>>,
) -> Option<Geometry> {
    let mut polygons: Vec<Polygon> = stitch_rings(outer_segments)
        .into_iter()
        .map(|exterior| Polygon {
            exterior,
            holes: Vec::new(),
        })
        .collect();

    for hole in stitch_rings(inner_segments) {
        let Some(&probe) = hole.first() else {
            continue;
        };
        if let Some(owner) = polygons
            .iter_mut()
            .find(|p| point_in_ring(probe, &p.exterior))
        {
            owner.holes.push(hole);
        }
    }

    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(polygons)),
    }
}
