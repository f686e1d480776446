use crate::config::DrawTool;
use crate::domain::{Coordinate, ZoneGeometry};

/// Phase of the draw-mode controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    CollectingPoints(DrawTool),
    ShapeComplete(DrawTool),
}

/// In-progress geometry for the armed tool
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSession {
    pub tool: DrawTool,
    /// Placed vertices in click order
    pub points: Vec<Coordinate>,
    /// Set once the shape is final and about to be emitted
    pub committed: bool,
    /// Live pointer position for previews
    pub cursor: Option<Coordinate>,
}

impl DrawSession {
    pub fn new(tool: DrawTool) -> Self {
        Self {
            tool,
            points: Vec::new(),
            committed: false,
            cursor: None,
        }
    }

    /// Points followed by the cursor, for drawing the rubber-band preview
    pub fn preview_points(&self) -> Vec<Coordinate> {
        let mut points = self.points.clone();
        if let (false, Some(cursor)) = (self.committed, self.cursor) {
            points.push(cursor);
        }
        points
    }
}

#[derive(Clone, Debug, Default)]
pub struct DrawState {
    /// Tool chosen by the user, stays armed across commits
    pub armed: Option<DrawTool>,
    pub session: Option<DrawSession>,
    /// Last committed geometry, kept for the overlay
    pub committed: Option<ZoneGeometry>,
}

impl DrawState {
    pub fn phase(&self) -> DrawPhase {
        match &self.session {
            None => DrawPhase::Idle,
            Some(session) if session.committed => DrawPhase::ShapeComplete(session.tool),
            Some(session) => DrawPhase::CollectingPoints(session.tool),
        }
    }

    /// Arm a tool and open an empty session for it
    pub fn arm(&mut self, tool: DrawTool) {
        self.armed = Some(tool);
        self.session = Some(DrawSession::new(tool));
    }

    /// Disarm and drop any in-progress session
    pub fn disarm(&mut self) {
        self.armed = None;
        self.session = None;
    }

    /// Session for the armed tool, opened on demand
    pub fn session_mut(&mut self) -> Option<&mut DrawSession> {
        let tool = self.armed?;
        Some(self.session.get_or_insert_with(|| DrawSession::new(tool)))
    }

    /// Drop the in-progress session, keeping the tool armed
    pub fn reset_session(&mut self) {
        self.session = None;
    }

    pub fn clear_all(&mut self) {
        self.session = None;
        self.committed = None;
    }

    pub fn in_progress_points(&self) -> &[Coordinate] {
        self.session
            .as_ref()
            .map(|s| s.points.as_slice())
            .unwrap_or(&[])
    }
}
