//! Reverse geocoding gateway using a Nominatim-compatible endpoint

use std::future::Future;

use reqwest::header::ACCEPT_LANGUAGE;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ZoneMapConfig;
use crate::domain::{AddressFields, Coordinate};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("geocoder returned HTTP {0}")]
    Status(u16),

    #[error("could not parse geocoder response: {0}")]
    Parse(String),

    #[error("no address found: {0}")]
    NotFound(String),
}

/// A provider that resolves a coordinate to address fields
pub trait ReverseGeocoder: Send + Sync + 'static {
    fn reverse_geocode(
        &self,
        at: Coordinate,
    ) -> impl Future<Output = Result<AddressFields, GeocodeError>> + Send;
}

/// Raw reverse geocoding response
#[derive(Debug, Default, Deserialize)]
pub struct RawReverseResponse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<RawAddress>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Address block of a raw response
#[derive(Debug, Default, Deserialize)]
pub struct RawAddress {
    pub road: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub neighbourhood: Option<String>,
    pub house_number: Option<Value>,
    pub postcode: Option<Value>,
    pub state: Option<String>,
    pub display_name: Option<String>,
}

/// Coerce a house number or postcode to an integer, 0 when not numeric
///
/// The whole trimmed string must parse. A leading-digit prefix is not
/// taken, so "221B" and "NW1" both give 0 rather than 221 and 0.
fn coerce_code(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        _ => 0,
    }
}

impl RawReverseResponse {
    /// Map the raw response into address fields, defaulting anything missing
    pub fn into_fields(self) -> AddressFields {
        let address = self.address.unwrap_or_default();
        AddressFields {
            street: address.road.unwrap_or_default(),
            city: address.city.or(address.town).unwrap_or_default(),
            neighborhood: address.neighbourhood.unwrap_or_default(),
            street_code: coerce_code(address.house_number.as_ref()),
            postal_code: coerce_code(address.postcode.as_ref()),
            province: address.state.unwrap_or_default(),
            display_name: self
                .display_name
                .or(address.display_name)
                .unwrap_or_default(),
        }
    }
}

/// Parse a response body into address fields
pub fn parse_response(body: &str) -> Result<AddressFields, GeocodeError> {
    let raw: RawReverseResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;
    if let Some(error) = raw.error {
        return Err(GeocodeError::NotFound(error));
    }
    Ok(raw.into_fields())
}

/// HTTP reverse geocoder
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
    accept_language: String,
}

impl NominatimGeocoder {
    pub fn new(config: &ZoneMapConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.geocode_timeout())
            .build()
            .map_err(|e| GeocodeError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.geocoder_endpoint.clone(),
            accept_language: config.accept_language.clone(),
        })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<AddressFields, GeocodeError> {
        log::debug!("Reverse geocoding {}, {}", at.lat, at.lng);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", at.lat.to_string()),
                ("lon", at.lng.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?;
        parse_response(&body)
    }
}
