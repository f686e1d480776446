//! Geometry normalizer
//!
//! Turns the raw points collected for a tool into a ZoneGeometry.
//! Every call produces a fresh value; points are used exactly as drawn.

use crate::config::DrawTool;
use crate::domain::{
    Coordinate, POLYGON_MIN_POINTS, POLYLINE_MIN_POINTS, ZoneGeometry, great_circle_distance,
};
use crate::error::EditorError;

/// Number of points a tool needs before it can be committed
pub fn required_points(tool: DrawTool) -> usize {
    match tool {
        DrawTool::Marker | DrawTool::CircleMarker => 1,
        DrawTool::Rectangle | DrawTool::Circle => 2,
        DrawTool::Polygon => POLYGON_MIN_POINTS,
        DrawTool::Polyline => POLYLINE_MIN_POINTS,
    }
}

/// Build the geometry for a tool from its collected points
pub fn normalize(tool: DrawTool, points: &[Coordinate]) -> Result<ZoneGeometry, EditorError> {
    let required = required_points(tool);
    if points.len() < required {
        return Err(EditorError::InvalidShape {
            tool,
            points: points.len(),
            required,
        });
    }

    let geometry = match tool {
        // Circle markers are points; their pixel radius is presentation only
        DrawTool::Marker | DrawTool::CircleMarker => ZoneGeometry::Marker {
            position: points[points.len() - 1],
        },
        DrawTool::Polygon => ZoneGeometry::Polygon {
            ring: points.to_vec(),
        },
        DrawTool::Polyline => ZoneGeometry::Polyline {
            path: points.to_vec(),
        },
        DrawTool::Rectangle => ZoneGeometry::Rectangle {
            corner1: points[0],
            corner2: points[1],
        },
        DrawTool::Circle => ZoneGeometry::Circle {
            center: points[0],
            radius_meters: great_circle_distance(points[0], points[1]),
        },
    };
    Ok(geometry)
}
