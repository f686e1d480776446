//! Draw message handlers
//!
//! Handles DrawMsg for every drawing tool. The handlers only touch
//! DrawState; emitting committed shapes is up to the caller.

use crate::config::{DrawControls, DrawTool};
use crate::domain::{Coordinate, ZoneGeometry};
use crate::draw::normalize::normalize;
use crate::error::EditorError;
use crate::session::messages::{DrawAction, DrawMsg};
use crate::session::state::DrawState;

/// Per-call context the handlers need from the surface and config
#[derive(Clone, Copy, Debug)]
pub struct DrawContext {
    pub controls: DrawControls,
    /// Clicking within this distance of the first vertex closes a polygon
    pub snap_tolerance_m: f64,
}

/// What a draw message did
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOutcome {
    /// Message ignored, nothing changed
    Unchanged,
    /// Tool or in-progress geometry changed
    Updated,
    /// Shape finished; the session is in ShapeComplete until the caller emits it
    Committed(ZoneGeometry),
    /// Finish was refused, the session keeps collecting
    Rejected(EditorError),
}

/// Handle a DrawMsg, modifying DrawState
pub fn handle_draw_msg(state: &mut DrawState, ctx: &DrawContext, msg: DrawMsg) -> DrawOutcome {
    match msg {
        DrawMsg::SelectTool(Some(tool)) => select_tool(state, ctx, tool),
        DrawMsg::SelectTool(None) => {
            if state.armed.is_none() && state.session.is_none() {
                return DrawOutcome::Unchanged;
            }
            state.disarm();
            DrawOutcome::Updated
        }
        DrawMsg::CycleTool => cycle_tool(state, ctx),
        DrawMsg::Clear => {
            state.clear_all();
            DrawOutcome::Updated
        }
        DrawMsg::Action(action) => handle_action(state, ctx, action),
    }
}

/// Leave ShapeComplete once the committed shape has been emitted
pub fn complete_commit(state: &mut DrawState) {
    if state.session.as_ref().is_some_and(|s| s.committed) {
        state.reset_session();
    }
}

// ============================================================================
// Tool selection
// ============================================================================

fn select_tool(state: &mut DrawState, ctx: &DrawContext, tool: DrawTool) -> DrawOutcome {
    if !ctx.controls.allows(tool) {
        log::debug!("Ignoring disabled tool {}", tool);
        return DrawOutcome::Unchanged;
    }
    if state.armed == Some(tool) {
        // Selecting the armed tool again toggles it off
        state.disarm();
    } else {
        state.arm(tool);
    }
    DrawOutcome::Updated
}

fn cycle_tool(state: &mut DrawState, ctx: &DrawContext) -> DrawOutcome {
    let start = state.armed.unwrap_or(DrawTool::CircleMarker);
    let mut tool = start.next();
    for _ in 0..DrawTool::ALL.len() {
        if ctx.controls.allows(tool) {
            if state.armed == Some(tool) {
                return DrawOutcome::Unchanged;
            }
            state.arm(tool);
            return DrawOutcome::Updated;
        }
        tool = tool.next();
    }
    DrawOutcome::Unchanged
}

// ============================================================================
// Pointer and keyboard actions
// ============================================================================

fn handle_action(state: &mut DrawState, ctx: &DrawContext, action: DrawAction) -> DrawOutcome {
    match action {
        DrawAction::Click(at) => handle_click(state, ctx, at),
        DrawAction::DoubleClick(_) => match state.armed {
            Some(tool) if tool.is_multi_point() => finish(state),
            _ => DrawOutcome::Unchanged,
        },
        DrawAction::Move(at) => {
            let Some(session) = state.session.as_mut() else {
                return DrawOutcome::Unchanged;
            };
            if session.committed || session.points.is_empty() {
                return DrawOutcome::Unchanged;
            }
            session.cursor = Some(at);
            DrawOutcome::Updated
        }
        DrawAction::DragEnd(at) => {
            let Some(session) = state.session.as_mut() else {
                return DrawOutcome::Unchanged;
            };
            if !session.tool.is_two_point() || session.points.len() != 1 || !at.is_valid() {
                return DrawOutcome::Unchanged;
            }
            // Released on the anchor: keep waiting for the second corner
            if session.points[0].distance_to(&at) <= ctx.snap_tolerance_m {
                return DrawOutcome::Unchanged;
            }
            session.points.push(at);
            commit(state)
        }
        DrawAction::Finish => finish(state),
        DrawAction::Cancel => {
            if state.session.is_none() {
                return DrawOutcome::Unchanged;
            }
            state.reset_session();
            DrawOutcome::Updated
        }
        DrawAction::RemoveLastPoint => {
            let Some(session) = state.session.as_mut() else {
                return DrawOutcome::Unchanged;
            };
            if session.committed || session.points.pop().is_none() {
                return DrawOutcome::Unchanged;
            }
            if session.points.is_empty() {
                session.cursor = None;
            }
            DrawOutcome::Updated
        }
    }
}

fn handle_click(state: &mut DrawState, ctx: &DrawContext, at: Coordinate) -> DrawOutcome {
    if !at.is_valid() {
        log::debug!("Ignoring click outside the coordinate range: {:?}", at);
        return DrawOutcome::Unchanged;
    }
    let Some(session) = state.session_mut() else {
        return DrawOutcome::Unchanged;
    };
    if session.committed {
        return DrawOutcome::Unchanged;
    }

    // The clicks of a double-click land on the point just placed, and a
    // second corner there would leave a shape with no extent
    let repeats_last = session
        .points
        .last()
        .is_some_and(|last| last.distance_to(&at) <= ctx.snap_tolerance_m);

    match session.tool {
        DrawTool::Polygon | DrawTool::Polyline | DrawTool::Rectangle | DrawTool::Circle
            if repeats_last =>
        {
            DrawOutcome::Unchanged
        }
        DrawTool::Marker | DrawTool::CircleMarker => {
            // At most one marker: a new click replaces the point
            session.points.clear();
            session.points.push(at);
            commit(state)
        }
        DrawTool::Rectangle | DrawTool::Circle => {
            session.points.push(at);
            if session.points.len() >= 2 {
                commit(state)
            } else {
                DrawOutcome::Updated
            }
        }
        DrawTool::Polygon => {
            let closes_ring = session.points.len() >= 3
                && session.points[0].distance_to(&at) <= ctx.snap_tolerance_m;
            if closes_ring {
                return commit(state);
            }
            session.points.push(at);
            DrawOutcome::Updated
        }
        DrawTool::Polyline => {
            session.points.push(at);
            DrawOutcome::Updated
        }
    }
}

fn finish(state: &mut DrawState) -> DrawOutcome {
    if state.session.as_ref().is_some_and(|s| !s.committed) {
        commit(state)
    } else {
        DrawOutcome::Unchanged
    }
}

fn commit(state: &mut DrawState) -> DrawOutcome {
    let Some(session) = state.session.as_mut() else {
        return DrawOutcome::Unchanged;
    };
    match normalize(session.tool, &session.points) {
        Ok(geometry) => {
            session.committed = true;
            session.cursor = None;
            log::debug!(
                "Committed {} with {} points",
                session.tool,
                session.points.len()
            );
            state.committed = Some(geometry.clone());
            DrawOutcome::Committed(geometry)
        }
        Err(err) => {
            log::debug!("Refusing to finish shape: {}", err);
            DrawOutcome::Rejected(err)
        }
    }
}
