//! Configuration persistence for zonemap settings

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;

/// Drawing tool type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawTool {
    #[default]
    Marker,
    Polygon,
    Rectangle,
    Circle,
    Polyline,
    CircleMarker,
}

impl DrawTool {
    pub const ALL: [DrawTool; 6] = [
        DrawTool::Marker,
        DrawTool::Polygon,
        DrawTool::Rectangle,
        DrawTool::Circle,
        DrawTool::Polyline,
        DrawTool::CircleMarker,
    ];

    /// Get the next drawing tool in the cycle
    pub fn next(self) -> Self {
        match self {
            DrawTool::Marker => DrawTool::Polygon,
            DrawTool::Polygon => DrawTool::Rectangle,
            DrawTool::Rectangle => DrawTool::Circle,
            DrawTool::Circle => DrawTool::Polyline,
            DrawTool::Polyline => DrawTool::CircleMarker,
            DrawTool::CircleMarker => DrawTool::Marker,
        }
    }

    /// Name used in payloads, logs and config files
    pub fn name(self) -> &'static str {
        match self {
            DrawTool::Marker => "marker",
            DrawTool::Polygon => "polygon",
            DrawTool::Rectangle => "rectangle",
            DrawTool::Circle => "circle",
            DrawTool::Polyline => "polyline",
            DrawTool::CircleMarker => "circlemarker",
        }
    }

    /// Tools completed by a second click or a drag release
    pub fn is_two_point(self) -> bool {
        matches!(self, DrawTool::Rectangle | DrawTool::Circle)
    }

    /// Tools collecting an open-ended vertex list
    pub fn is_multi_point(self) -> bool {
        matches!(self, DrawTool::Polygon | DrawTool::Polyline)
    }
}

impl fmt::Display for DrawTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which drawing tools and overlays the host page enables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawControls {
    pub marker: bool,
    pub polygon: bool,
    pub rectangle: bool,
    pub circle: bool,
    pub polyline: bool,
    pub circlemarker: bool,
    /// Show the device position as its own marker
    #[serde(alias = "userPosition")]
    pub user_position: bool,
}

impl DrawControls {
    /// Controls used by the address pages: a single marker
    pub fn address() -> Self {
        Self {
            marker: true,
            user_position: true,
            ..Default::default()
        }
    }

    /// Controls used by the zone creation page
    pub fn zone() -> Self {
        Self {
            polygon: true,
            rectangle: true,
            circle: true,
            ..Default::default()
        }
    }

    /// Check if a tool is enabled
    pub fn allows(&self, tool: DrawTool) -> bool {
        match tool {
            DrawTool::Marker => self.marker,
            DrawTool::Polygon => self.polygon,
            DrawTool::Rectangle => self.rectangle,
            DrawTool::Circle => self.circle,
            DrawTool::Polyline => self.polyline,
            DrawTool::CircleMarker => self.circlemarker,
        }
    }

    /// Enabled tools in toolbar order
    pub fn enabled_tools(&self) -> Vec<DrawTool> {
        DrawTool::ALL
            .into_iter()
            .filter(|tool| self.allows(*tool))
            .collect()
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMapConfig {
    /// Map center used when the device location cannot be obtained
    #[serde(default = "default_fallback_position")]
    pub fallback_position: Coordinate,
    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,
    /// How long to wait for a device location fix
    #[serde(default = "default_geolocation_timeout_ms")]
    pub geolocation_timeout_ms: u64,
    /// Tile URL template with {z}, {x}, {y} and optional {s}
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    /// Subdomains substituted for {s}
    #[serde(default = "default_tile_subdomains")]
    pub tile_subdomains: Vec<String>,
    /// Reverse geocoding endpoint
    #[serde(default = "default_geocoder_endpoint")]
    pub geocoder_endpoint: String,
    /// User-Agent sent to the geocoder
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Preferred language for geocoded labels
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Geocoder request timeout
    #[serde(default = "default_geocode_timeout_ms")]
    pub geocode_timeout_ms: u64,
    /// Clicking this close to the first polygon vertex closes the ring
    #[serde(default = "default_snap_pixels")]
    pub snap_pixels: f64,
    /// Pointer travel after which a press becomes a drag
    #[serde(default = "default_drag_threshold_pixels")]
    pub drag_threshold_pixels: f64,
    /// Screen radius of circle markers
    #[serde(default = "default_circle_marker_radius_pixels")]
    pub circle_marker_radius_pixels: f64,
    /// Tools enabled when the host does not pass its own controls
    #[serde(default = "DrawControls::zone")]
    pub controls: DrawControls,
}

fn default_fallback_position() -> Coordinate {
    Coordinate::new(51.505, -0.09) // London
}

fn default_zoom() -> f64 {
    13.0
}

fn default_geolocation_timeout_ms() -> u64 {
    5000
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_tile_subdomains() -> Vec<String> {
    vec!["a".to_string(), "b".to_string(), "c".to_string()]
}

fn default_geocoder_endpoint() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_user_agent() -> String {
    concat!("zonemap/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_accept_language() -> String {
    "en".to_string()
}

fn default_geocode_timeout_ms() -> u64 {
    10_000
}

fn default_snap_pixels() -> f64 {
    10.0
}

fn default_drag_threshold_pixels() -> f64 {
    4.0
}

fn default_circle_marker_radius_pixels() -> f64 {
    10.0
}

impl ZoneMapConfig {
    /// Application directory name under the user config dir
    pub const APP_DIR: &'static str = "zonemap";

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("No user config directory")?;
        Ok(dir.join(Self::APP_DIR).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(err) => {
                log::warn!("Could not locate config file: {:?}", err);
                return Self::default();
            }
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match Self::config_path() {
            Ok(path) => {
                if let Err(err) = self.save_to(&path) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            Err(err) => {
                log::error!("Could not locate config file for saving: {:?}", err);
            }
        }
    }

    /// Load from an explicit path, Ok(None) when the file does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(Some(config))
    }

    /// Write to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }
}

impl Default for ZoneMapConfig {
    fn default() -> Self {
        Self {
            fallback_position: default_fallback_position(),
            default_zoom: default_zoom(),
            geolocation_timeout_ms: default_geolocation_timeout_ms(),
            tile_url: default_tile_url(),
            tile_subdomains: default_tile_subdomains(),
            geocoder_endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            geocode_timeout_ms: default_geocode_timeout_ms(),
            snap_pixels: default_snap_pixels(),
            drag_threshold_pixels: default_drag_threshold_pixels(),
            circle_marker_radius_pixels: default_circle_marker_radius_pixels(),
            controls: DrawControls::zone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_cycle_visits_every_tool() {
        let mut tool = DrawTool::Marker;
        for _ in 0..DrawTool::ALL.len() {
            tool = tool.next();
        }
        assert_eq!(tool, DrawTool::Marker);
        assert_eq!(DrawTool::CircleMarker.to_string(), "circlemarker");
    }

    #[test]
    fn test_controls_accept_camel_case_user_position() {
        let controls: DrawControls =
            serde_json::from_str(r#"{"marker": true, "userPosition": true}"#).unwrap();
        assert!(controls.marker);
        assert!(controls.user_position);
        assert!(!controls.polygon);
        assert_eq!(controls.enabled_tools(), vec![DrawTool::Marker]);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ZoneMapConfig =
            serde_json::from_str(r#"{"default_zoom": 9.0, "geolocation_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.default_zoom, 9.0);
        assert_eq!(config.geolocation_timeout(), Duration::from_millis(250));
        assert_eq!(config.tile_url, default_tile_url());
        assert_eq!(config.controls, DrawControls::zone());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        assert!(ZoneMapConfig::load_from(&path).unwrap().is_none());

        let config = ZoneMapConfig {
            fallback_position: Coordinate::new(35.69, 51.39),
            controls: DrawControls::address(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        let loaded = ZoneMapConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ZoneMapConfig::load_from(&path).is_err());
    }
}
