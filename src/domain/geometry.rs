//! Geographic coordinates and spherical distance math

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (same sphere the tile maps use)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a new coordinate from latitude and longitude
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that latitude is within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to another coordinate in meters
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        great_circle_distance(*self, *other)
    }
}

/// Haversine distance between two coordinates in meters
pub fn great_circle_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Twice the signed planar area of a ring in degree space
///
/// Positive for counter-clockwise rings when longitude is x and latitude is y.
pub fn signed_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + 1) % ring.len()];
        sum += a.lng * b.lat - b.lng * a.lat;
    }
    sum
}

/// Axis-aligned lat/lng bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Bounds spanning two arbitrary corners
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        let (south, north) = if a.lat < b.lat { (a.lat, b.lat) } else { (b.lat, a.lat) };
        let (west, east) = if a.lng < b.lng { (a.lng, b.lng) } else { (b.lng, a.lng) };
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Smallest bounds containing every coordinate, None when empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_corners(*first, *first);
        for p in iter {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    /// Grow the bounds to include a coordinate
    pub fn extend(&mut self, c: Coordinate) {
        self.south = self.south.min(c.lat);
        self.north = self.north.max(c.lat);
        self.west = self.west.min(c.lng);
        self.east = self.east.max(c.lng);
    }

    pub fn north_west(&self) -> Coordinate {
        Coordinate::new(self.north, self.west)
    }

    pub fn south_east(&self) -> Coordinate {
        Coordinate::new(self.south, self.east)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) * 0.5,
            (self.west + self.east) * 0.5,
        )
    }

    /// Check if the bounds contain a coordinate (edges inclusive)
    pub fn contains(&self, c: Coordinate) -> bool {
        c.lat >= self.south && c.lat <= self.north && c.lng >= self.west && c.lng <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(0.0, 0.0).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(Coordinate::new(-90.0, -180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_distance_berlin_paris() {
        let berlin = Coordinate::new(52.5200, 13.4050);
        let paris = Coordinate::new(48.8566, 2.3522);
        let km = great_circle_distance(berlin, paris) / 1000.0;
        assert!((km - 878.0).abs() < 10.0, "got {km}");
    }

    #[test]
    fn test_distance_is_symmetric_and_zero_on_self() {
        let a = Coordinate::new(51.505, -0.09);
        let b = Coordinate::new(51.51, -0.1);
        assert_eq!(a.distance_to(&a), 0.0);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = great_circle_distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_signed_area_winding() {
        let ccw = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
        ];
        assert!(signed_area(&ccw) > 0.0);
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert!(signed_area(&cw) < 0.0);
        assert_eq!(signed_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_bounds_from_points() {
        let pts = [
            Coordinate::new(1.0, 5.0),
            Coordinate::new(-2.0, 3.0),
            Coordinate::new(0.5, 7.0),
        ];
        let b = Bounds::from_points(&pts).unwrap();
        assert_eq!(b.south, -2.0);
        assert_eq!(b.north, 1.0);
        assert_eq!(b.west, 3.0);
        assert_eq!(b.east, 7.0);
        assert!(b.contains(Coordinate::new(0.0, 4.0)));
        assert!(!b.contains(Coordinate::new(2.0, 4.0)));
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }
}
