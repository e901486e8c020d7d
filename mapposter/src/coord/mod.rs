//! Coordinate handling module
//!
//! Provides validated geographic coordinates, the Web Mercator projection
//! used for plotting, and bounding boxes derived from a center and radius.

mod types;

pub use types::{
    BoundingBox, CoordError, Coordinates, ProjectedPoint, CACHE_KEY_PRECISION, MAX_LAT, MAX_LON,
    MERCATOR_MAX_LAT, MIN_LAT, MIN_LON,
};

use std::f64::consts::PI;

/// Equatorial radius of the WGS84 ellipsoid in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Meters per degree of latitude (mean).
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Projects geographic coordinates to Web Mercator meters.
///
/// Latitudes beyond the projection limit are clamped to
/// ±[`MERCATOR_MAX_LAT`]. The y axis grows northwards.
#[inline]
pub fn project(lat: f64, lon: f64) -> ProjectedPoint {
    let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let lon_rad = lon * PI / 180.0;
    let lat_rad = lat * PI / 180.0;

    ProjectedPoint {
        x: EARTH_RADIUS_M * lon_rad,
        y: EARTH_RADIUS_M * lat_rad.tan().asinh(),
    }
}

/// Inverse of [`project`].
#[inline]
pub fn unproject(point: ProjectedPoint) -> (f64, f64) {
    let lon = point.x / EARTH_RADIUS_M * 180.0 / PI;
    let lat = (point.y / EARTH_RADIUS_M).sinh().atan() * 180.0 / PI;
    (lat, lon)
}

/// Computes a square bounding box extending `radius_m` meters from the center
/// in each cardinal direction.
///
/// The box is clamped to valid latitude/longitude ranges.
pub fn bounding_box(center: &Coordinates, radius_m: u32) -> BoundingBox {
    let radius = radius_m as f64;
    let delta_lat = radius / METERS_PER_DEGREE_LAT;

    // Longitude degrees shrink with latitude; avoid the pole singularity.
    let cos_lat = (center.latitude() * PI / 180.0).cos().max(1e-6);
    let delta_lon = radius / (METERS_PER_DEGREE_LAT * cos_lat);

    BoundingBox {
        south: (center.latitude() - delta_lat).max(MIN_LAT),
        west: (center.longitude() - delta_lon).max(MIN_LON),
        north: (center.latitude() + delta_lat).min(MAX_LAT),
        east: (center.longitude() + delta_lon).min(MAX_LON),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_valid() {
        let coords = Coordinates::new(48.8566, 2.3522).unwrap();
        assert_eq!(coords.latitude(), 48.8566);
        assert_eq!(coords.longitude(), 2.3522);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = Coordinates::new(90.5, 0.0);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));

        let result = Coordinates::new(f64::NAN, 0.0);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = Coordinates::new(0.0, -180.1);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_bounds_inclusive() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_cache_key_fragment_absorbs_jitter() {
        let a = Coordinates::new(48.856_600_01, 2.352_199_99).unwrap();
        let b = Coordinates::new(48.8566, 2.3522).unwrap();
        assert_eq!(a.cache_key_fragment(), b.cache_key_fragment());
        assert_eq!(b.cache_key_fragment(), "48.8566,2.3522");
    }

    #[test]
    fn test_cache_key_fragment_negative_zero() {
        let a = Coordinates::new(-0.00001, 0.0).unwrap();
        let b = Coordinates::new(0.0, 0.0).unwrap();
        assert_eq!(a.cache_key_fragment(), b.cache_key_fragment());
    }

    #[test]
    fn test_project_origin() {
        let p = project(0.0, 0.0);
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_project_roundtrip_paris() {
        let p = project(48.8566, 2.3522);
        let (lat, lon) = unproject(p);
        assert!((lat - 48.8566).abs() < 1e-9);
        assert!((lon - 2.3522).abs() < 1e-9);
    }

    #[test]
    fn test_project_clamps_poles() {
        let north = project(90.0, 0.0);
        let limit = project(MERCATOR_MAX_LAT, 0.0);
        assert_eq!(north.y, limit.y);
        assert!(north.y.is_finite());
    }

    #[test]
    fn test_bounding_box_around_paris() {
        let center = Coordinates::new(48.8566, 2.3522).unwrap();
        let bbox = bounding_box(&center, 10_000);

        assert!(bbox.south < 48.8566 && bbox.north > 48.8566);
        assert!(bbox.west < 2.3522 && bbox.east > 2.3522);
        // ~0.0898 degrees of latitude for 10 km
        assert!(((bbox.north - bbox.south) / 2.0 - 0.0898).abs() < 0.001);
        // Longitude span is wider than latitude span away from the equator
        assert!(bbox.east - bbox.west > bbox.north - bbox.south);
        assert!(bbox.contains(48.8566, 2.3522));
    }

    #[test]
    fn test_bounding_box_clamped() {
        let center = Coordinates::new(89.99, 179.99).unwrap();
        let bbox = bounding_box(&center, 50_000);
        assert!(bbox.north <= MAX_LAT);
        assert!(bbox.east <= MAX_LON);
    }
}
