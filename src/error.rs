//! Editor advisories
//!
//! None of these abort the editor. They are recorded and surfaced to the
//! host as warning text while interaction continues.

use std::time::Duration;

use thiserror::Error;

use crate::config::DrawTool;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("location unavailable, showing default map center: {0}")]
    GeolocationUnavailable(String),

    #[error("location request timed out after {}ms, showing default map center", .0.as_millis())]
    GeolocationTimeout(Duration),

    #[error("address lookup failed: {0}")]
    GeocodeLookupFailed(String),

    #[error("{tool} needs at least {required} points, has {points}")]
    InvalidShape {
        tool: DrawTool,
        points: usize,
        required: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EditorError::InvalidShape {
            tool: DrawTool::Polygon,
            points: 2,
            required: 3,
        };
        assert_eq!(err.to_string(), "polygon needs at least 3 points, has 2");

        let err = EditorError::GeolocationTimeout(Duration::from_millis(5000));
        assert!(err.to_string().contains("5000ms"));
        assert_eq!(
            EditorError::GeocodeLookupFailed("HTTP 503".into()).to_string(),
            "address lookup failed: HTTP 503"
        );
    }
}
