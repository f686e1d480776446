//! The map editor component
//!
//! `MapEditor` owns the draw state, the map surface and the in-flight I/O of
//! one mounted editor. The host drives it like an event loop:
//!
//! - raw input and caller snapshots go in through [`MapEditor::update`]
//! - finished lookups come back from [`MapEditor::next_completion`] and are
//!   fed to `update` again
//! - payloads for the caller leave through the `EditorEvent` channel
//!
//! Lookup results are applied in the order their I/O completes, which may
//! differ from click order when several lookups overlap.

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;

use crate::config::{DrawControls, DrawTool, ZoneMapConfig};
use crate::domain::{AddressFields, AddressForm, Coordinate, ZoneForm, ZoneGeometry};
use crate::draw::handlers::{DrawContext, DrawOutcome, complete_commit, handle_draw_msg};
use crate::error::EditorError;
use crate::geocode::{GeocodeError, ReverseGeocoder};
use crate::geolocation::{
    GeolocationFix, GeolocationOutcome, LocationSource, acquire, fallback_outcome,
};
use crate::session::messages::{DrawMsg, MapMsg};
use crate::session::shortcuts::handle_key_event;
use crate::session::state::{DrawPhase, DrawState};
use crate::surface::{MapSurface, Overlay, TileId};

/// What a committed marker turns into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Marker plus lookup, proposes a whole address form
    Address,
    /// Marker plus lookup, reports the coordinate and its address fields
    Locate,
    /// Shape tools, reports the committed geometry
    Zone,
}

/// Payloads sent to the caller
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    AddressProposed(AddressForm),
    ZoneCommitted(ZoneGeometry),
    LocationSelected {
        position: Coordinate,
        fields: AddressFields,
    },
    UserPositionAcquired(GeolocationFix),
    Advisory(EditorError),
}

impl EditorEvent {
    /// JSON shape handed to web callers
    pub fn to_json(&self) -> Value {
        match self {
            EditorEvent::AddressProposed(form) => {
                json!({ "event": "addressProposed", "form": form })
            }
            EditorEvent::ZoneCommitted(geometry) => {
                json!({ "event": "zoneCommitted", "geometry": geometry })
            }
            EditorEvent::LocationSelected { position, fields } => json!({
                "event": "locationSelected",
                "position": position,
                "fields": fields,
            }),
            EditorEvent::UserPositionAcquired(fix) => {
                json!({ "event": "userPositionAcquired", "fix": fix })
            }
            EditorEvent::Advisory(advisory) => {
                json!({ "event": "advisory", "message": advisory.to_string() })
            }
        }
    }
}

impl AddressForm {
    /// Fold an editor event into the form; returns whether it changed
    pub fn apply(&mut self, event: &EditorEvent) -> bool {
        let next = match event {
            EditorEvent::AddressProposed(form) => form.clone(),
            EditorEvent::LocationSelected { position, fields } => {
                self.with_location(*position, fields)
            }
            _ => return false,
        };
        let changed = *self != next;
        *self = next;
        changed
    }
}

impl ZoneForm {
    /// Fold an editor event into the form; returns whether it changed
    pub fn apply(&mut self, event: &EditorEvent) -> bool {
        match event {
            EditorEvent::ZoneCommitted(geometry) => {
                let changed = self.geometry.as_ref() != Some(geometry);
                self.geometry = Some(geometry.clone());
                changed
            }
            _ => false,
        }
    }
}

const NO_RUNTIME: &str = "no async runtime to run the request on";

pub struct MapEditor<G: ReverseGeocoder> {
    config: ZoneMapConfig,
    controls: DrawControls,
    mode: EditorMode,
    draw: DrawState,
    surface: MapSurface,
    user_position: Option<GeolocationFix>,
    location_requested: bool,
    address: AddressForm,
    initial_zone: Option<ZoneGeometry>,
    selected_position: Option<Coordinate>,
    advisories: Vec<EditorError>,
    geocoder: Arc<G>,
    runtime: Option<Handle>,
    tasks: JoinSet<MapMsg>,
    events: UnboundedSender<EditorEvent>,
}

impl<G: ReverseGeocoder> MapEditor<G> {
    pub fn new(
        config: ZoneMapConfig,
        controls: DrawControls,
        mode: EditorMode,
        geocoder: Arc<G>,
        events: UnboundedSender<EditorEvent>,
    ) -> Self {
        let mut draw = DrawState::default();
        let enabled = controls.enabled_tools();
        match mode {
            EditorMode::Address | EditorMode::Locate if controls.allows(DrawTool::Marker) => {
                draw.arm(DrawTool::Marker);
            }
            // A single enabled tool needs no toolbar choice
            EditorMode::Zone if enabled.len() == 1 => draw.arm(enabled[0]),
            _ => {}
        }

        Self {
            surface: MapSurface::new(&config),
            config,
            controls,
            mode,
            draw,
            user_position: None,
            location_requested: false,
            address: AddressForm::default(),
            initial_zone: None,
            selected_position: None,
            advisories: Vec::new(),
            geocoder,
            runtime: Handle::try_current().ok(),
            tasks: JoinSet::new(),
            events,
        }
    }

    /// Run I/O tasks on this runtime instead of the one current at construction
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Start the one location request of this mount
    pub fn mount<L: LocationSource>(&mut self, source: Arc<L>) {
        if self.location_requested {
            log::debug!("Location already requested for this mount");
            return;
        }
        self.location_requested = true;

        let timeout = self.config.geolocation_timeout();
        let fallback = self.config.fallback_position;
        let spawned = self.spawn_task(async move {
            MapMsg::Geolocated(acquire(source.as_ref(), timeout, fallback).await)
        });
        if !spawned {
            let advisory = EditorError::GeolocationUnavailable(NO_RUNTIME.to_string());
            self.handle_geolocated(fallback_outcome(fallback, advisory));
        }
    }

    /// Abort every in-flight task; nothing spawned before this is delivered
    pub fn unmount(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("Aborting {} editor task(s)", self.tasks.len());
        }
        // Dropping the set aborts its tasks, including finished ones not yet joined
        drop(std::mem::take(&mut self.tasks));
        self.location_requested = false;
        self.user_position = None;
        self.advisories.clear();
        self.draw.reset_session();
    }

    /// Handle one message synchronously
    pub fn update(&mut self, msg: MapMsg) {
        match msg {
            MapMsg::Draw(draw_msg) => self.handle_draw(draw_msg),
            MapMsg::Pointer(event) => {
                let anchors = self.draw.armed.is_some_and(DrawTool::is_two_point);
                if let Some(action) = self.surface.translate_pointer(event, anchors) {
                    self.handle_draw(DrawMsg::Action(action));
                }
            }
            MapMsg::Key(key) => {
                if let Some(msg) = handle_key_event(&self.draw, key) {
                    self.update(msg);
                }
            }
            MapMsg::View(view_msg) => self.surface.apply_view(view_msg),
            MapMsg::SetAddressForm(form) => self.set_address_form(form),
            MapMsg::SetSelectedPosition(position) => {
                self.selected_position = position.filter(Coordinate::is_valid);
                if let Some(at) = self.selected_position {
                    self.surface.center_on(at);
                }
            }
            MapMsg::SetInitialZone(zone) => {
                if let Some(zone) = &zone {
                    self.surface.frame(zone);
                }
                self.initial_zone = zone;
            }
            MapMsg::Geolocated(outcome) => self.handle_geolocated(outcome),
            MapMsg::Geocoded { at, result } => self.handle_geocoded(at, result),
        }
    }

    /// Next finished task result, in completion order
    ///
    /// Returns None once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<MapMsg> {
        loop {
            match self.tasks.join_next().await? {
                Ok(msg) => return Some(msg),
                Err(err) if err.is_cancelled() => continue,
                Err(err) => log::error!("Editor task failed: {}", err),
            }
        }
    }

    /// Apply task results until nothing is in flight
    pub async fn settle(&mut self) {
        while let Some(msg) = self.next_completion().await {
            self.update(msg);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn phase(&self) -> DrawPhase {
        self.draw.phase()
    }

    pub fn draw_state(&self) -> &DrawState {
        &self.draw
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn user_position(&self) -> Option<&GeolocationFix> {
        self.user_position.as_ref()
    }

    pub fn address_snapshot(&self) -> &AddressForm {
        &self.address
    }

    pub fn selected_position(&self) -> Option<Coordinate> {
        self.selected_position
    }

    /// Warnings recorded since the last drain, oldest first
    pub fn advisories(&self) -> &[EditorError] {
        &self.advisories
    }

    /// Hand over the recorded warnings and start a fresh list
    pub fn take_advisories(&mut self) -> Vec<EditorError> {
        std::mem::take(&mut self.advisories)
    }

    pub fn overlays(&self) -> Vec<Overlay> {
        let user = self
            .user_position
            .as_ref()
            .filter(|fix| self.controls.user_position && !fix.is_fallback())
            .map(|fix| fix.coordinate);
        self.surface
            .overlays(&self.draw, user, self.initial_zone.as_ref())
    }

    pub fn tiles(&self) -> Vec<(TileId, String)> {
        self.surface.tiles()
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    fn handle_draw(&mut self, msg: DrawMsg) {
        let ctx = DrawContext {
            controls: self.controls,
            snap_tolerance_m: self.surface.snap_tolerance_m(),
        };
        match handle_draw_msg(&mut self.draw, &ctx, msg) {
            DrawOutcome::Committed(geometry) => {
                self.emit_commit(geometry);
                complete_commit(&mut self.draw);
            }
            DrawOutcome::Rejected(advisory) => self.advise(advisory),
            DrawOutcome::Updated | DrawOutcome::Unchanged => {}
        }
    }

    fn emit_commit(&mut self, geometry: ZoneGeometry) {
        match (self.mode, &geometry) {
            (EditorMode::Address | EditorMode::Locate, ZoneGeometry::Marker { position }) => {
                self.spawn_lookup(*position);
            }
            _ => self.emit(EditorEvent::ZoneCommitted(geometry)),
        }
    }

    fn spawn_lookup(&mut self, at: Coordinate) {
        let geocoder = Arc::clone(&self.geocoder);
        let spawned = self.spawn_task(async move {
            let result = geocoder.reverse_geocode(at).await;
            MapMsg::Geocoded { at, result }
        });
        if !spawned {
            self.advise(EditorError::GeocodeLookupFailed(NO_RUNTIME.to_string()));
        }
    }

    /// Queue a task on the editor's runtime; false when there is none
    fn spawn_task<F>(&mut self, task: F) -> bool
    where
        F: Future<Output = MapMsg> + Send + 'static,
    {
        match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(handle) => {
                self.tasks.spawn_on(task, &handle);
                true
            }
            None => false,
        }
    }

    fn handle_geocoded(&mut self, at: Coordinate, result: Result<AddressFields, GeocodeError>) {
        let fields = match result {
            Ok(fields) => fields,
            Err(err) => {
                // The caller's form stays as it was
                self.advise(EditorError::GeocodeLookupFailed(err.to_string()));
                return;
            }
        };

        match self.mode {
            EditorMode::Address => {
                let form = self.address.with_location(at, &fields);
                self.emit(EditorEvent::AddressProposed(form));
            }
            EditorMode::Locate => {
                self.emit(EditorEvent::LocationSelected {
                    position: at,
                    fields,
                });
            }
            EditorMode::Zone => log::debug!("Dropping address lookup in zone mode"),
        }
    }

    fn handle_geolocated(&mut self, outcome: GeolocationOutcome) {
        if self.user_position.is_some() {
            log::debug!("User position already set for this mount");
            return;
        }
        if let Some(advisory) = outcome.advisory {
            self.advise(advisory);
        }
        self.surface.recenter_on_user(outcome.fix.coordinate);
        self.user_position = Some(outcome.fix.clone());
        self.emit(EditorEvent::UserPositionAcquired(outcome.fix));
    }

    fn set_address_form(&mut self, form: AddressForm) {
        // Show the caller's current pick unless the user placed a newer one
        if let Some(at) = form.picked_position() {
            if self.draw.committed.is_none() {
                self.draw.committed = Some(ZoneGeometry::Marker { position: at });
            }
        }
        self.address = form;
    }

    fn advise(&mut self, advisory: EditorError) {
        log::warn!("{}", advisory);
        self.advisories.push(advisory.clone());
        self.emit(EditorEvent::Advisory(advisory));
    }

    fn emit(&self, event: EditorEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Editor event receiver is gone");
        }
    }
}

impl<G: ReverseGeocoder> Drop for MapEditor<G> {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}
