//! Message types for the map editor
//!
//! This module contains:
//! - MapMsg enum with nested sub-enums for organized message handling
//! - Raw pointer and keyboard input types delivered by the host surface

use serde::Deserialize;

use crate::config::DrawTool;
use crate::domain::{AddressFields, AddressForm, Coordinate, ZoneGeometry};
use crate::geocode::GeocodeError;
use crate::geolocation::GeolocationOutcome;

// ============================================================================
// Drawing Action Types
// ============================================================================

/// Draw action for the active tool, in map coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DrawAction {
    /// Single click at position
    Click(Coordinate),
    /// Double click at position (finishes multi-point shapes)
    DoubleClick(Coordinate),
    /// Pointer moved while drawing (preview only)
    Move(Coordinate),
    /// Pointer released at position after a drag
    DragEnd(Coordinate),
    /// Finish the in-progress shape
    Finish,
    /// Discard the in-progress shape
    Cancel,
    /// Remove the last placed vertex
    RemoveLastPoint,
}

/// Tool selection and drawing messages
#[derive(Debug, Clone, PartialEq)]
pub enum DrawMsg {
    /// Arm a tool, or disarm with None
    SelectTool(Option<DrawTool>),
    /// Arm the next enabled tool
    CycleTool,
    /// Action for the armed tool
    Action(DrawAction),
    /// Drop the in-progress shape and the committed overlay
    Clear,
}

// ============================================================================
// Viewport Types
// ============================================================================

/// Viewport navigation messages
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMsg {
    ZoomIn,
    ZoomOut,
    /// Set an absolute zoom level
    Zoom(f64),
    /// Pan by a screen-space offset in pixels
    Pan(f64, f64),
    /// Surface was resized
    Resize(f64, f64),
}

// ============================================================================
// Raw Input Types
// ============================================================================

/// Pointer event kind as delivered by the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Click,
    DoubleClick,
}

/// Pointer event in surface pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }
}

/// Keyboard key as delivered by the host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Delete,
    Character(char),
}

// ============================================================================
// Top-level Message
// ============================================================================

/// All messages handled by the map editor
#[derive(Debug, Clone)]
pub enum MapMsg {
    Draw(DrawMsg),
    Pointer(PointerEvent),
    Key(Key),
    View(ViewMsg),
    /// Caller's current address form (controlled value)
    SetAddressForm(AddressForm),
    /// Externally selected position to center on
    SetSelectedPosition(Option<Coordinate>),
    /// Existing zone to display and frame
    SetInitialZone(Option<ZoneGeometry>),
    /// Location acquisition finished
    Geolocated(GeolocationOutcome),
    /// Reverse geocoding finished for a clicked coordinate
    Geocoded {
        at: Coordinate,
        result: Result<AddressFields, GeocodeError>,
    },
}

impl MapMsg {
    pub fn select_tool(tool: DrawTool) -> Self {
        MapMsg::Draw(DrawMsg::SelectTool(Some(tool)))
    }

    pub fn clear_tool() -> Self {
        MapMsg::Draw(DrawMsg::SelectTool(None))
    }

    pub fn cycle_tool() -> Self {
        MapMsg::Draw(DrawMsg::CycleTool)
    }

    pub fn clear() -> Self {
        MapMsg::Draw(DrawMsg::Clear)
    }

    pub fn click(at: Coordinate) -> Self {
        MapMsg::Draw(DrawMsg::Action(DrawAction::Click(at)))
    }

    pub fn double_click(at: Coordinate) -> Self {
        MapMsg::Draw(DrawMsg::Action(DrawAction::DoubleClick(at)))
    }

    pub fn pointer_moved(at: Coordinate) -> Self {
        MapMsg::Draw(DrawMsg::Action(DrawAction::Move(at)))
    }

    pub fn drag_end(at: Coordinate) -> Self {
        MapMsg::Draw(DrawMsg::Action(DrawAction::DragEnd(at)))
    }

    pub fn finish() -> Self {
        MapMsg::Draw(DrawMsg::Action(DrawAction::Finish))
    }

    pub fn cancel() -> Self {
        MapMsg::Draw(DrawMsg::Action(DrawAction::Cancel))
    }

    pub fn remove_last_point() -> Self {
        MapMsg::Draw(DrawMsg::Action(DrawAction::RemoveLastPoint))
    }

    pub fn zoom_in() -> Self {
        MapMsg::View(ViewMsg::ZoomIn)
    }

    pub fn zoom_out() -> Self {
        MapMsg::View(ViewMsg::ZoomOut)
    }
}
