//! Zone geometry types
//!
//! All geometries store coordinates exactly as the user drew them.
//! Winding and corner order are never canonicalized implicitly; callers
//! that need it use the explicit helpers below.

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Coordinate, great_circle_distance, signed_area};

/// Minimum vertices for a polygon ring
pub const POLYGON_MIN_POINTS: usize = 3;
/// Minimum vertices for a polyline path
pub const POLYLINE_MIN_POINTS: usize = 2;

/// A delivery zone or picked location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ZoneGeometry {
    Marker { position: Coordinate },
    /// Implicitly closed ring, first vertex is not repeated
    Polygon { ring: Vec<Coordinate> },
    /// Opposite corners in the order they were drawn
    Rectangle { corner1: Coordinate, corner2: Coordinate },
    Circle { center: Coordinate, radius_meters: f64 },
    Polyline { path: Vec<Coordinate> },
}

impl ZoneGeometry {
    /// Defining vertices of the geometry
    pub fn vertices(&self) -> Vec<Coordinate> {
        match self {
            ZoneGeometry::Marker { position } => vec![*position],
            ZoneGeometry::Polygon { ring } => ring.clone(),
            ZoneGeometry::Rectangle { corner1, corner2 } => vec![*corner1, *corner2],
            ZoneGeometry::Circle { center, .. } => vec![*center],
            ZoneGeometry::Polyline { path } => path.clone(),
        }
    }

    /// Whether the geometry satisfies its minimum-point rule
    pub fn is_complete(&self) -> bool {
        match self {
            ZoneGeometry::Polygon { ring } => ring.len() >= POLYGON_MIN_POINTS,
            ZoneGeometry::Polyline { path } => path.len() >= POLYLINE_MIN_POINTS,
            ZoneGeometry::Circle { radius_meters, .. } => *radius_meters >= 0.0,
            ZoneGeometry::Marker { .. } | ZoneGeometry::Rectangle { .. } => true,
        }
    }

    /// Bounding box of the geometry
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            ZoneGeometry::Circle {
                center,
                radius_meters,
            } => {
                // Approximate the circle extent on the sphere
                let dlat = (radius_meters / super::geometry::EARTH_RADIUS_M).to_degrees();
                let cos_lat = center.lat.to_radians().cos().max(1e-9);
                let dlng = dlat / cos_lat;
                Some(Bounds {
                    south: (center.lat - dlat).max(-90.0),
                    north: (center.lat + dlat).min(90.0),
                    west: (center.lng - dlng).max(-180.0),
                    east: (center.lng + dlng).min(180.0),
                })
            }
            other => Bounds::from_points(&other.vertices()),
        }
    }

    /// Check whether a coordinate falls inside the zone
    ///
    /// Markers and polylines have no interior and never contain anything.
    pub fn contains(&self, at: Coordinate) -> bool {
        match self {
            ZoneGeometry::Polygon { ring } => ring.len() >= POLYGON_MIN_POINTS && ring_contains(ring, at),
            ZoneGeometry::Rectangle { corner1, corner2 } => {
                Bounds::from_corners(*corner1, *corner2).contains(at)
            }
            ZoneGeometry::Circle {
                center,
                radius_meters,
            } => great_circle_distance(*center, at) <= *radius_meters,
            ZoneGeometry::Marker { .. } | ZoneGeometry::Polyline { .. } => false,
        }
    }

    /// A copy whose polygon ring winds counter-clockwise
    ///
    /// Non-polygon geometries are returned unchanged.
    pub fn with_counter_clockwise_winding(&self) -> Self {
        match self {
            ZoneGeometry::Polygon { ring } if signed_area(ring) < 0.0 => {
                let mut ring = ring.clone();
                ring.reverse();
                ZoneGeometry::Polygon { ring }
            }
            other => other.clone(),
        }
    }

    /// Rectangle corners sorted as (north-west, south-east)
    pub fn canonical_corners(&self) -> Option<(Coordinate, Coordinate)> {
        match self {
            ZoneGeometry::Rectangle { corner1, corner2 } => {
                let b = Bounds::from_corners(*corner1, *corner2);
                Some((b.north_west(), b.south_east()))
            }
            _ => None,
        }
    }
}

/// Even-odd ray casting test in degree space
fn ring_contains(ring: &[Coordinate], at: Coordinate) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > at.lat) != (b.lat > at.lat) {
            let cross = (b.lng - a.lng) * (at.lat - a.lat) / (b.lat - a.lat) + a.lng;
            if at.lng < cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Zone form owned by the caller
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneForm {
    pub geometry: Option<ZoneGeometry>,
}

impl ZoneForm {
    /// Whether the form holds a geometry that may be submitted
    pub fn can_submit(&self) -> bool {
        self.geometry.as_ref().is_some_and(ZoneGeometry::is_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    fn square() -> ZoneGeometry {
        ZoneGeometry::Polygon {
            ring: vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(1.0, 0.0)],
        }
    }

    #[test]
    fn test_polygon_contains() {
        let zone = square();
        assert!(zone.contains(c(0.5, 0.5)));
        assert!(!zone.contains(c(1.5, 0.5)));
        assert!(!zone.contains(c(0.5, -0.1)));
    }

    #[test]
    fn test_circle_contains() {
        let zone = ZoneGeometry::Circle {
            center: c(51.505, -0.09),
            radius_meters: 500.0,
        };
        assert!(zone.contains(c(51.506, -0.09)));
        assert!(!zone.contains(c(51.515, -0.09)));
    }

    #[test]
    fn test_marker_and_polyline_have_no_interior() {
        let marker = ZoneGeometry::Marker { position: c(1.0, 1.0) };
        assert!(!marker.contains(c(1.0, 1.0)));
        let line = ZoneGeometry::Polyline {
            path: vec![c(0.0, 0.0), c(1.0, 1.0)],
        };
        assert!(!line.contains(c(0.5, 0.5)));
    }

    #[test]
    fn test_winding_helper_reverses_clockwise_only() {
        let cw = ZoneGeometry::Polygon {
            ring: vec![c(0.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)],
        };
        let fixed = cw.with_counter_clockwise_winding();
        assert_eq!(
            fixed,
            ZoneGeometry::Polygon {
                ring: vec![c(0.0, 1.0), c(1.0, 1.0), c(0.0, 0.0)],
            }
        );
        assert_eq!(fixed.with_counter_clockwise_winding(), fixed);
    }

    #[test]
    fn test_canonical_corners() {
        let rect = ZoneGeometry::Rectangle {
            corner1: c(0.0, 2.0),
            corner2: c(3.0, -1.0),
        };
        assert_eq!(rect.canonical_corners(), Some((c(3.0, -1.0), c(0.0, 2.0))));
        assert_eq!(square().canonical_corners(), None);
    }

    #[test]
    fn test_zone_form_submit_rule() {
        let mut form = ZoneForm::default();
        assert!(!form.can_submit());
        form.geometry = Some(ZoneGeometry::Polygon {
            ring: vec![c(0.0, 0.0), c(0.0, 1.0)],
        });
        assert!(!form.can_submit());
        form.geometry = Some(square());
        assert!(form.can_submit());
    }

    #[test]
    fn test_geometry_serializes_tagged() {
        let json = serde_json::to_value(ZoneGeometry::Circle {
            center: c(1.0, 2.0),
            radius_meters: 10.0,
        })
        .unwrap();
        assert_eq!(json["type"], "circle");
        assert_eq!(json["center"]["lat"], 1.0);
        assert_eq!(json["center"]["lng"], 2.0);
        assert_eq!(json["radius_meters"], 10.0);
    }
}
