use crate::config::DrawTool;
use crate::session::messages::{Key, MapMsg};
use crate::session::state::{DrawPhase, DrawState};

pub fn handle_key_event(state: &DrawState, key: Key) -> Option<MapMsg> {
    let drawing = matches!(state.phase(), DrawPhase::CollectingPoints(_));

    match key {
        // Escape: drop the shape being drawn, or disarm when nothing is in progress
        Key::Escape if drawing => Some(MapMsg::cancel()),
        Key::Escape if state.armed.is_some() => Some(MapMsg::clear_tool()),
        Key::Enter if drawing => Some(MapMsg::finish()),
        Key::Backspace if drawing => Some(MapMsg::remove_last_point()),
        Key::Delete => Some(MapMsg::clear()),
        // Zoom
        Key::Character('+') | Key::Character('=') => Some(MapMsg::zoom_in()),
        Key::Character('-') => Some(MapMsg::zoom_out()),
        // Tool selection (disabled tools are rejected by the controller)
        Key::Character('t') => Some(MapMsg::cycle_tool()),
        Key::Character('m') => Some(MapMsg::select_tool(DrawTool::Marker)),
        Key::Character('p') => Some(MapMsg::select_tool(DrawTool::Polygon)),
        Key::Character('r') => Some(MapMsg::select_tool(DrawTool::Rectangle)),
        Key::Character('c') => Some(MapMsg::select_tool(DrawTool::Circle)),
        Key::Character('l') => Some(MapMsg::select_tool(DrawTool::Polyline)),
        Key::Character('o') => Some(MapMsg::select_tool(DrawTool::CircleMarker)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::messages::{DrawAction, DrawMsg};

    fn drawing_state() -> DrawState {
        let mut state = DrawState::default();
        state.arm(DrawTool::Polygon);
        state
    }

    #[test]
    fn test_enter_finishes_only_while_drawing() {
        let msg = handle_key_event(&drawing_state(), Key::Enter);
        assert!(matches!(
            msg,
            Some(MapMsg::Draw(DrawMsg::Action(DrawAction::Finish)))
        ));
        assert!(handle_key_event(&DrawState::default(), Key::Enter).is_none());
    }

    #[test]
    fn test_escape_cancels_then_disarms() {
        let mut state = drawing_state();
        assert!(matches!(
            handle_key_event(&state, Key::Escape),
            Some(MapMsg::Draw(DrawMsg::Action(DrawAction::Cancel)))
        ));
        state.reset_session();
        assert!(matches!(
            handle_key_event(&state, Key::Escape),
            Some(MapMsg::Draw(DrawMsg::SelectTool(None)))
        ));
        state.disarm();
        assert!(handle_key_event(&state, Key::Escape).is_none());
    }

    #[test]
    fn test_tool_keys() {
        let state = DrawState::default();
        assert!(matches!(
            handle_key_event(&state, Key::Character('r')),
            Some(MapMsg::Draw(DrawMsg::SelectTool(Some(DrawTool::Rectangle))))
        ));
        assert!(handle_key_event(&state, Key::Character('z')).is_none());
    }
}
