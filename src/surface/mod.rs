//! Map surface: viewport, tiles, overlays and pointer translation
//!
//! The surface holds no authoritative geometry. Everything it draws comes
//! from the draw state and the caller's snapshots; it only turns raw
//! pointer input into draw actions and keeps the view framed.

pub mod tiles;
pub mod viewport;

use crate::config::{DrawTool, ZoneMapConfig};
use crate::domain::{Coordinate, ZoneGeometry};
use crate::session::messages::{DrawAction, PointerEvent, PointerKind, ViewMsg};
use crate::session::state::DrawState;

pub use tiles::{TileId, tile_url, visible_tiles};
pub use viewport::Viewport;

/// Padding kept around a framed geometry, in pixels
pub const FIT_PADDING: f64 = 20.0;
pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;

/// Something the host draws on top of the tiles
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    /// Where the device (or fallback) says the user is
    UserPosition(Coordinate),
    /// Zone handed in by the caller
    InitialZone(ZoneGeometry),
    /// Last shape the user finished
    Committed(ZoneGeometry),
    /// Marker placed with the circle-marker tool, sized in screen pixels
    CircleMarker { center: Coordinate, radius_pixels: f64 },
    /// Shape being drawn, including the live cursor point
    Preview { tool: DrawTool, points: Vec<Coordinate> },
}

/// A press in progress
#[derive(Clone, Copy, Debug)]
struct Gesture {
    start: (f64, f64),
    last: (f64, f64),
    dragging: bool,
    /// The press itself placed a point (two-point tools)
    anchored: bool,
}

#[derive(Clone, Debug)]
pub struct MapSurface {
    pub viewport: Viewport,
    tile_template: String,
    subdomains: Vec<String>,
    snap_pixels: f64,
    drag_threshold: f64,
    circle_marker_radius: f64,
    gesture: Option<Gesture>,
    suppress_click: bool,
    /// A selected position or initial zone already framed the view
    pinned: bool,
}

impl MapSurface {
    pub fn new(config: &ZoneMapConfig) -> Self {
        Self {
            viewport: Viewport::new(
                config.fallback_position,
                config.default_zoom,
                DEFAULT_WIDTH,
                DEFAULT_HEIGHT,
            ),
            tile_template: config.tile_url.clone(),
            subdomains: config.tile_subdomains.clone(),
            snap_pixels: config.snap_pixels,
            drag_threshold: config.drag_threshold_pixels,
            circle_marker_radius: config.circle_marker_radius_pixels,
            gesture: None,
            suppress_click: false,
            pinned: false,
        }
    }

    /// Snap distance on the ground at the current zoom
    pub fn snap_tolerance_m(&self) -> f64 {
        self.snap_pixels * self.viewport.meters_per_pixel()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn apply_view(&mut self, msg: ViewMsg) {
        match msg {
            ViewMsg::ZoomIn => self.viewport.zoom_by(1.0),
            ViewMsg::ZoomOut => self.viewport.zoom_by(-1.0),
            ViewMsg::Zoom(zoom) => self.viewport.set_zoom(zoom),
            ViewMsg::Pan(dx, dy) => self.viewport.pan_by(dx, dy),
            ViewMsg::Resize(width, height) => self.viewport.resize(width, height),
        }
    }

    /// Center on the user's position unless the caller already framed the view
    pub fn recenter_on_user(&mut self, at: Coordinate) {
        if self.pinned {
            log::debug!("View pinned, not recentering on user position");
            return;
        }
        self.viewport.center = at;
    }

    /// Center on an externally selected position
    pub fn center_on(&mut self, at: Coordinate) {
        self.viewport.center = at;
        self.pinned = true;
    }

    /// Fit the view to a geometry's extent
    pub fn frame(&mut self, geometry: &ZoneGeometry) {
        if let Some(bounds) = geometry.bounds() {
            self.viewport.fit_bounds(bounds, FIT_PADDING);
            self.pinned = true;
        }
    }

    /// Tiles to fetch for the current view, with their URLs
    pub fn tiles(&self) -> Vec<(TileId, String)> {
        visible_tiles(&self.viewport)
            .into_iter()
            .map(|tile| (tile, tile_url(&self.tile_template, &self.subdomains, tile)))
            .collect()
    }

    /// Turn a raw pointer event into a draw action
    ///
    /// `anchors_on_press` is set while a rectangle or circle is armed: the
    /// press places the first point and releasing after a drag places the
    /// second. Otherwise a drag pans the map and only clicks place points.
    pub fn translate_pointer(
        &mut self,
        event: PointerEvent,
        anchors_on_press: bool,
    ) -> Option<DrawAction> {
        let here = (event.x, event.y);
        match event.kind {
            PointerKind::Down => {
                self.suppress_click = false;
                self.gesture = Some(Gesture {
                    start: here,
                    last: here,
                    dragging: false,
                    anchored: anchors_on_press,
                });
                anchors_on_press.then(|| DrawAction::Click(self.at(here)))
            }
            PointerKind::Move => {
                if let Some(gesture) = self.gesture.as_mut() {
                    let (dx, dy) = (here.0 - gesture.start.0, here.1 - gesture.start.1);
                    if dx.hypot(dy) > self.drag_threshold {
                        gesture.dragging = true;
                    }
                    if gesture.dragging && !gesture.anchored {
                        let (last_x, last_y) = gesture.last;
                        self.viewport.pan_by(last_x - here.0, last_y - here.1);
                    }
                    gesture.last = here;
                }
                Some(DrawAction::Move(self.at(here)))
            }
            PointerKind::Up => {
                let gesture = self.gesture.take()?;
                // The host follows every release with a click
                self.suppress_click = gesture.dragging || gesture.anchored;
                (gesture.anchored && gesture.dragging).then(|| DrawAction::DragEnd(self.at(here)))
            }
            PointerKind::Click => {
                if std::mem::take(&mut self.suppress_click) {
                    return None;
                }
                Some(DrawAction::Click(self.at(here)))
            }
            PointerKind::DoubleClick => Some(DrawAction::DoubleClick(self.at(here))),
        }
    }

    fn at(&self, (x, y): (f64, f64)) -> Coordinate {
        self.viewport.screen_to_coordinate(x, y)
    }

    /// Everything to draw above the tiles, bottom to top
    pub fn overlays(
        &self,
        state: &DrawState,
        user_position: Option<Coordinate>,
        initial_zone: Option<&ZoneGeometry>,
    ) -> Vec<Overlay> {
        let mut overlays = Vec::new();
        if let Some(zone) = initial_zone {
            overlays.push(Overlay::InitialZone(zone.clone()));
        }
        if let Some(at) = user_position {
            overlays.push(Overlay::UserPosition(at));
        }
        match &state.committed {
            Some(ZoneGeometry::Marker { position }) if state.armed == Some(DrawTool::CircleMarker) => {
                overlays.push(Overlay::CircleMarker {
                    center: *position,
                    radius_pixels: self.circle_marker_radius,
                });
            }
            Some(geometry) => overlays.push(Overlay::Committed(geometry.clone())),
            None => {}
        }
        if let Some(session) = state.session.as_ref().filter(|s| !s.committed) {
            let points = session.preview_points();
            if !points.is_empty() {
                overlays.push(Overlay::Preview {
                    tool: session.tool,
                    points,
                });
            }
        }
        overlays
    }
}
