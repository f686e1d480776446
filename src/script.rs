//! Recorded editor sessions
//!
//! A session script is a JSON document describing how an editor is set up
//! and the steps a user took. Replaying it drives a real `MapEditor` and
//! returns every event the caller would have received.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::config::{DrawControls, DrawTool, ZoneMapConfig};
use crate::domain::{AddressForm, Coordinate, ZoneGeometry};
use crate::editor::{EditorEvent, EditorMode, MapEditor};
use crate::geocode::ReverseGeocoder;
use crate::geolocation::NoLocation;
use crate::session::messages::{Key, MapMsg, PointerEvent, PointerKind, ViewMsg};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScript {
    pub mode: EditorMode,
    /// Falls back to the configured controls in zone mode, marker otherwise
    #[serde(default)]
    pub controls: Option<DrawControls>,
    #[serde(default)]
    pub address_form: Option<AddressForm>,
    #[serde(default)]
    pub selected_position: Option<Coordinate>,
    #[serde(default)]
    pub initial_zone: Option<ZoneGeometry>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One recorded user or host action
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Step {
    SelectTool { tool: Option<DrawTool> },
    CycleTool,
    Click { lat: f64, lng: f64 },
    DoubleClick { lat: f64, lng: f64 },
    Move { lat: f64, lng: f64 },
    DragEnd { lat: f64, lng: f64 },
    Finish,
    Cancel,
    RemoveLastPoint,
    Clear,
    Key { key: String },
    Pointer { kind: PointerKind, x: f64, y: f64 },
    Zoom { level: f64 },
    Resize { width: f64, height: f64 },
    SetAddressForm { form: AddressForm },
    /// Wait for every in-flight lookup before continuing
    Settle,
}

impl SessionScript {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session script {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse session script {}", path.display()))
    }
}

/// Parse a key name as recorded in scripts
pub fn parse_key(name: &str) -> Result<Key> {
    let key = match name {
        "Escape" => Key::Escape,
        "Enter" => Key::Enter,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Character(c),
                _ => bail!("Unknown key {:?}", other),
            }
        }
    };
    Ok(key)
}

impl Step {
    /// Message for this step; None for Settle
    pub fn to_msg(&self) -> Result<Option<MapMsg>> {
        let at = |lat: f64, lng: f64| Coordinate::new(lat, lng);
        let msg = match self {
            Step::SelectTool { tool: Some(tool) } => MapMsg::select_tool(*tool),
            Step::SelectTool { tool: None } => MapMsg::clear_tool(),
            Step::CycleTool => MapMsg::cycle_tool(),
            Step::Click { lat, lng } => MapMsg::click(at(*lat, *lng)),
            Step::DoubleClick { lat, lng } => MapMsg::double_click(at(*lat, *lng)),
            Step::Move { lat, lng } => MapMsg::pointer_moved(at(*lat, *lng)),
            Step::DragEnd { lat, lng } => MapMsg::drag_end(at(*lat, *lng)),
            Step::Finish => MapMsg::finish(),
            Step::Cancel => MapMsg::cancel(),
            Step::RemoveLastPoint => MapMsg::remove_last_point(),
            Step::Clear => MapMsg::clear(),
            Step::Key { key } => MapMsg::Key(parse_key(key)?),
            Step::Pointer { kind, x, y } => MapMsg::Pointer(PointerEvent::new(*kind, *x, *y)),
            Step::Zoom { level } => MapMsg::View(ViewMsg::Zoom(*level)),
            Step::Resize { width, height } => MapMsg::View(ViewMsg::Resize(*width, *height)),
            Step::SetAddressForm { form } => MapMsg::SetAddressForm(form.clone()),
            Step::Settle => return Ok(None),
        };
        Ok(Some(msg))
    }
}

/// Run a script against a fresh editor and collect its events in order
///
/// The editor is mounted without a device location, so it starts at the
/// configured fallback position.
pub async fn replay<G: ReverseGeocoder>(
    script: &SessionScript,
    config: ZoneMapConfig,
    geocoder: Arc<G>,
) -> Result<Vec<EditorEvent>> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let controls = script.controls.unwrap_or(match script.mode {
        EditorMode::Zone => config.controls,
        EditorMode::Address | EditorMode::Locate => DrawControls::address(),
    });
    let mut editor = MapEditor::new(config, controls, script.mode, geocoder, tx);

    editor.mount(Arc::new(NoLocation));
    editor.settle().await;

    if let Some(form) = &script.address_form {
        editor.update(MapMsg::SetAddressForm(form.clone()));
    }
    if script.selected_position.is_some() {
        editor.update(MapMsg::SetSelectedPosition(script.selected_position));
    }
    if script.initial_zone.is_some() {
        editor.update(MapMsg::SetInitialZone(script.initial_zone.clone()));
    }

    for (index, step) in script.steps.iter().enumerate() {
        match step.to_msg().with_context(|| format!("Step {}", index + 1))? {
            Some(msg) => editor.update(msg),
            None => editor.settle().await,
        }
    }
    editor.settle().await;
    drop(editor);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AddressFields;
    use crate::geocode::GeocodeError;

    struct Street;

    impl ReverseGeocoder for Street {
        async fn reverse_geocode(&self, _at: Coordinate) -> Result<AddressFields, GeocodeError> {
            Ok(AddressFields {
                street: "Baker St".to_string(),
                ..AddressFields::default()
            })
        }
    }

    fn parse(json: &str) -> SessionScript {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(parse_key("Enter").unwrap(), Key::Enter);
        assert_eq!(parse_key("p").unwrap(), Key::Character('p'));
        assert!(parse_key("F13").is_err());
    }

    #[test]
    fn test_script_parses_steps() {
        let script = parse(
            r#"{
                "mode": "zone",
                "controls": { "polygon": true, "userPosition": false },
                "steps": [
                    { "action": "selectTool", "tool": "polygon" },
                    { "action": "click", "lat": 0.0, "lng": 0.0 },
                    { "action": "pointer", "kind": "doubleClick", "x": 10.0, "y": 20.0 },
                    { "action": "settle" }
                ]
            }"#,
        );
        assert_eq!(script.mode, EditorMode::Zone);
        assert_eq!(script.steps.len(), 4);
        assert!(script.controls.is_some_and(|c| c.polygon && !c.marker));
        assert!(script.steps[3].to_msg().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replay_zone_session() {
        let script = parse(
            r#"{
                "mode": "zone",
                "steps": [
                    { "action": "selectTool", "tool": "polygon" },
                    { "action": "click", "lat": 0.0, "lng": 0.0 },
                    { "action": "click", "lat": 0.0, "lng": 1.0 },
                    { "action": "key", "key": "Enter" },
                    { "action": "click", "lat": 1.0, "lng": 1.0 },
                    { "action": "finish" }
                ]
            }"#,
        );
        let events = replay(&script, ZoneMapConfig::default(), Arc::new(Street))
            .await
            .unwrap();

        // Fallback advisory, fallback fix, refused finish, committed ring
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], EditorEvent::Advisory(_)));
        assert!(matches!(events[1], EditorEvent::UserPositionAcquired(_)));
        assert!(matches!(events[2], EditorEvent::Advisory(_)));
        assert!(matches!(
            &events[3],
            EditorEvent::ZoneCommitted(ZoneGeometry::Polygon { ring }) if ring.len() == 3
        ));
    }

    #[tokio::test]
    async fn test_replay_address_session() {
        let script = parse(
            r#"{
                "mode": "address",
                "steps": [{ "action": "click", "lat": 51.505, "lng": -0.09 }]
            }"#,
        );
        let events = replay(&script, ZoneMapConfig::default(), Arc::new(Street))
            .await
            .unwrap();
        let Some(EditorEvent::AddressProposed(form)) = events.last() else {
            panic!("expected an address, got {:?}", events);
        };
        assert_eq!(form.street, "Baker St");
        assert_eq!(form.position.latitude, "51.505");
    }

    #[tokio::test]
    async fn test_bad_key_names_the_step() {
        let script = parse(r#"{ "mode": "zone", "steps": [{ "action": "key", "key": "Hyper" }] }"#);
        let err = replay(&script, ZoneMapConfig::default(), Arc::new(Street))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).starts_with("Step 1"));
    }
}
