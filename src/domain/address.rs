//! Address form types produced by marker mode
//!
//! The form mirrors what the address pages submit to the backend, so the
//! coordinate is kept as text the same way a form input would hold it.

use serde::{Deserialize, Serialize};

use super::geometry::Coordinate;

/// Position block of an address form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Human-readable reverse-geocoded label
    pub name: String,
    pub longitude: String,
    pub latitude: String,
}

impl Position {
    /// Build a position from a coordinate and a display label
    pub fn from_coordinate(at: Coordinate, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            longitude: at.lng.to_string(),
            latitude: at.lat.to_string(),
        }
    }

    /// Parse the text fields back into a coordinate
    ///
    /// Returns None when either field is empty or not a number.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.latitude.trim().parse::<f64>().ok()?;
        let lng = self.longitude.trim().parse::<f64>().ok()?;
        Some(Coordinate::new(lat, lng))
    }
}

/// Address fields returned by the geocoding gateway
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub street: String,
    pub city: String,
    pub neighborhood: String,
    pub street_code: u32,
    pub postal_code: u32,
    pub province: String,
    pub display_name: String,
}

/// Canonical address form owned by the caller
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressForm {
    pub street: String,
    pub city: String,
    pub neighborhood: String,
    pub street_code: u32,
    pub postal_code: u32,
    pub province: String,
    pub position: Position,
}

impl AddressForm {
    /// A new form with every geocoded field and the position replaced
    ///
    /// The receiver is left untouched.
    pub fn with_location(&self, at: Coordinate, fields: &AddressFields) -> Self {
        Self {
            street: fields.street.clone(),
            city: fields.city.clone(),
            neighborhood: fields.neighborhood.clone(),
            street_code: fields.street_code,
            postal_code: fields.postal_code,
            province: fields.province.clone(),
            position: Position::from_coordinate(at, fields.display_name.clone()),
        }
    }

    /// Coordinate picked on the map, if the form holds a usable one
    pub fn picked_position(&self) -> Option<Coordinate> {
        self.position.coordinate().filter(Coordinate::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_text_round_trip() {
        let pos = Position::from_coordinate(Coordinate::new(51.505, -0.09), "");
        assert_eq!(pos.latitude, "51.505");
        assert_eq!(pos.longitude, "-0.09");
        assert_eq!(pos.coordinate(), Some(Coordinate::new(51.505, -0.09)));
    }

    #[test]
    fn test_empty_position_has_no_coordinate() {
        let form = AddressForm::default();
        assert_eq!(form.position.coordinate(), None);
        assert_eq!(form.picked_position(), None);
    }

    #[test]
    fn test_out_of_range_position_is_not_picked() {
        let form = AddressForm {
            position: Position {
                name: String::new(),
                longitude: "12.0".to_string(),
                latitude: "95.0".to_string(),
            },
            ..Default::default()
        };
        assert!(form.position.coordinate().is_some());
        assert_eq!(form.picked_position(), None);
    }

    #[test]
    fn test_with_location_leaves_source_untouched() {
        let before = AddressForm {
            street: "Old".to_string(),
            ..Default::default()
        };
        let fields = AddressFields {
            street: "Baker St".to_string(),
            city: "London".to_string(),
            display_name: "221, Baker St".to_string(),
            ..Default::default()
        };
        let after = before.with_location(Coordinate::new(51.52, -0.15), &fields);
        assert_eq!(before.street, "Old");
        assert_eq!(after.street, "Baker St");
        assert_eq!(after.city, "London");
        assert_eq!(after.position.name, "221, Baker St");
        assert_eq!(after.picked_position(), Some(Coordinate::new(51.52, -0.15)));
    }

    #[test]
    fn test_serializes_with_backend_field_names() {
        let json = serde_json::to_value(AddressForm::default()).unwrap();
        assert!(json.get("street_code").is_some());
        assert!(json.get("postal_code").is_some());
        assert_eq!(json["position"]["longitude"], "");
    }
}
