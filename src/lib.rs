//! Delivery-zone and address map editor core
//!
//! The editor is independent of any UI toolkit. A host page feeds it raw
//! pointer and keyboard input plus its own form snapshots, and receives
//! normalized address and zone payloads back over a channel.

pub mod config;
pub mod domain;
pub mod draw;
pub mod editor;
pub mod error;
pub mod geocode;
pub mod geolocation;
pub mod script;
pub mod session;
pub mod surface;

pub use config::{DrawControls, DrawTool, ZoneMapConfig};
pub use domain::{AddressFields, AddressForm, Coordinate, Position, ZoneForm, ZoneGeometry};
pub use editor::{EditorEvent, EditorMode, MapEditor};
pub use error::EditorError;
pub use geocode::{GeocodeError, NominatimGeocoder, ReverseGeocoder};
pub use geolocation::{GeolocationFix, LocationSource};
pub use session::messages::MapMsg;
