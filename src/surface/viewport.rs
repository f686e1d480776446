//! Web-Mercator viewport math
//!
//! World pixel space at zoom z is a square of 256 * 2^z pixels with the
//! origin at the north-west corner (lat 85.0511, lng -180).

use crate::domain::{Bounds, Coordinate, EARTH_RADIUS_M};

/// Tile edge in pixels
pub const TILE_SIZE: f64 = 256.0;
/// Latitude limit of the square Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 19.0;
/// Deepest zoom used when framing a geometry
pub const MAX_FIT_ZOOM: f64 = 17.0;

/// World size in pixels at a zoom level
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Project a coordinate to world pixels at a zoom level
pub fn project(c: Coordinate, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = c.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (c.lng + 180.0) / 360.0 * size;
    let y = (1.0 - lat.tan().asinh() / std::f64::consts::PI) / 2.0 * size;
    (x, y)
}

/// Inverse of project; longitude is wrapped into [-180, 180]
pub fn unproject(x: f64, y: f64, zoom: f64) -> Coordinate {
    let size = world_size(zoom);
    let lng = wrap_longitude(x / size * 360.0 - 180.0);
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    Coordinate::new(lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lng)
}

/// Wrap a longitude into [-180, 180]
pub fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        return lng;
    }
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lng > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Visible region of the map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: f64,
    /// Surface size in pixels
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    /// World pixel of the surface's top-left corner
    fn origin(&self) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom);
        (cx - self.width / 2.0, cy - self.height / 2.0)
    }

    /// Coordinate under a surface pixel
    pub fn screen_to_coordinate(&self, x: f64, y: f64) -> Coordinate {
        let (ox, oy) = self.origin();
        unproject(ox + x, oy + y, self.zoom)
    }

    /// Surface pixel of a coordinate (may lie outside the surface)
    pub fn coordinate_to_screen(&self, c: Coordinate) -> (f64, f64) {
        let (ox, oy) = self.origin();
        let (x, y) = project(c, self.zoom);
        (x - ox, y - oy)
    }

    /// Ground resolution at the viewport center
    pub fn meters_per_pixel(&self) -> f64 {
        let circumference = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M;
        circumference * self.center.lat.to_radians().cos() / world_size(self.zoom)
    }

    /// Coordinates of the visible corners
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(
            self.screen_to_coordinate(0.0, 0.0),
            self.screen_to_coordinate(self.width, self.height),
        )
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.zoom + delta);
    }

    /// Move the view by a pixel offset
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.center = self.screen_to_coordinate(self.width / 2.0 + dx, self.height / 2.0 + dy);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Center on bounds at the deepest zoom that shows them with padding
    pub fn fit_bounds(&mut self, bounds: Bounds, padding: f64) {
        let (x1, y1) = project(bounds.north_west(), 0.0);
        let (x2, y2) = project(bounds.south_east(), 0.0);
        let (span_x, span_y) = ((x2 - x1).abs(), (y2 - y1).abs());

        let avail_w = (self.width - 2.0 * padding).max(1.0);
        let avail_h = (self.height - 2.0 * padding).max(1.0);
        let zoom = if span_x <= f64::EPSILON && span_y <= f64::EPSILON {
            MAX_FIT_ZOOM
        } else {
            let scale_x = if span_x > 0.0 { avail_w / span_x } else { f64::INFINITY };
            let scale_y = if span_y > 0.0 { avail_h / span_y } else { f64::INFINITY };
            scale_x.min(scale_y).log2().floor().min(MAX_FIT_ZOOM)
        };

        self.center = unproject((x1 + x2) / 2.0, (y1 + y2) / 2.0, 0.0);
        self.set_zoom(zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Coordinate, b: Coordinate) -> bool {
        (a.lat - b.lat).abs() < 1e-9 && (a.lng - b.lng).abs() < 1e-9
    }

    #[test]
    fn test_project_origin_and_center() {
        let (x, y) = project(Coordinate::new(0.0, 0.0), 0.0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
        let (x, y) = project(Coordinate::new(MAX_LATITUDE, -180.0), 1.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_project_unproject_round_trip() {
        let c = Coordinate::new(51.505, -0.09);
        let (x, y) = project(c, 13.0);
        assert!(close(unproject(x, y, 13.0), c));
    }

    #[test]
    fn test_screen_center_is_view_center() {
        let view = Viewport::new(Coordinate::new(48.8566, 2.3522), 12.0, 800.0, 600.0);
        assert!(close(view.screen_to_coordinate(400.0, 300.0), view.center));
        let (x, y) = view.coordinate_to_screen(view.center);
        assert!((x - 400.0).abs() < 1e-6 && (y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_axes() {
        let view = Viewport::new(Coordinate::new(0.0, 0.0), 5.0, 200.0, 200.0);
        let right = view.screen_to_coordinate(150.0, 100.0);
        let down = view.screen_to_coordinate(100.0, 150.0);
        assert!(right.lng > 0.0);
        assert!(down.lat < 0.0);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(540.0), 180.0);
        assert_eq!(wrap_longitude(45.0), 45.0);
    }

    #[test]
    fn test_meters_per_pixel_at_equator() {
        let view = Viewport::new(Coordinate::new(0.0, 0.0), 0.0, 256.0, 256.0);
        assert!((view.meters_per_pixel() - 156_367.8).abs() < 10.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = Viewport::new(Coordinate::new(0.0, 0.0), 25.0, 100.0, 100.0);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_by(-100.0);
        assert_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_fit_bounds_contains_corners() {
        let mut view = Viewport::new(Coordinate::new(0.0, 0.0), 2.0, 800.0, 600.0);
        let bounds = Bounds::from_corners(Coordinate::new(51.49, -0.12), Coordinate::new(51.52, -0.07));
        view.fit_bounds(bounds, 20.0);
        assert!(view.zoom > 10.0 && view.zoom <= MAX_FIT_ZOOM);
        let visible = view.bounds();
        assert!(visible.contains(bounds.north_west()));
        assert!(visible.contains(bounds.south_east()));
    }

    #[test]
    fn test_fit_single_point() {
        let mut view = Viewport::new(Coordinate::new(0.0, 0.0), 2.0, 800.0, 600.0);
        let p = Coordinate::new(10.0, 20.0);
        view.fit_bounds(Bounds::from_corners(p, p), 20.0);
        assert_eq!(view.zoom, MAX_FIT_ZOOM);
        assert!(close(view.center, p));
    }
}
