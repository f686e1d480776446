//! Device location with a timeout and fallback
//!
//! A single position request races a timer. Whichever finishes first wins;
//! the loser is dropped. Failures degrade to the configured fallback
//! coordinate and an advisory for the user, never an error.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::Coordinate;
use crate::error::EditorError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("location capability is unavailable")]
    Unavailable,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("location request failed: {0}")]
    Failed(String),
}

/// The host's current-position capability
pub trait LocationSource: Send + Sync + 'static {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Where a fix came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixSource {
    Device,
    Fallback,
}

/// Position obtained once per mount
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeolocationFix {
    pub coordinate: Coordinate,
    pub source: FixSource,
    pub acquired_at: DateTime<Utc>,
}

impl GeolocationFix {
    pub fn is_fallback(&self) -> bool {
        self.source == FixSource::Fallback
    }
}

/// Result of one acquisition, with the warning to show if it degraded
#[derive(Clone, Debug, PartialEq)]
pub struct GeolocationOutcome {
    pub fix: GeolocationFix,
    pub advisory: Option<EditorError>,
}

/// Outcome that places the user at the fallback coordinate
pub fn fallback_outcome(fallback: Coordinate, advisory: EditorError) -> GeolocationOutcome {
    log::warn!("{}", advisory);
    GeolocationOutcome {
        fix: GeolocationFix {
            coordinate: fallback,
            source: FixSource::Fallback,
            acquired_at: Utc::now(),
        },
        advisory: Some(advisory),
    }
}

/// Request the current position, falling back on timeout or failure
pub async fn acquire<L: LocationSource>(
    source: &L,
    timeout: Duration,
    fallback: Coordinate,
) -> GeolocationOutcome {
    let degraded = |advisory: EditorError| fallback_outcome(fallback, advisory);

    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(Ok(coordinate)) if coordinate.is_valid() => {
            log::info!("Location fix at {}, {}", coordinate.lat, coordinate.lng);
            GeolocationOutcome {
                fix: GeolocationFix {
                    coordinate,
                    source: FixSource::Device,
                    acquired_at: Utc::now(),
                },
                advisory: None,
            }
        }
        Ok(Ok(coordinate)) => degraded(EditorError::GeolocationUnavailable(format!(
            "device reported an invalid position {}, {}",
            coordinate.lat, coordinate.lng
        ))),
        Ok(Err(err)) => degraded(EditorError::GeolocationUnavailable(err.to_string())),
        Err(_) => degraded(EditorError::GeolocationTimeout(timeout)),
    }
}

/// A source that always reports the same position
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(pub Coordinate);

impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// A host without any location capability
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLocation;

impl LocationSource for NoLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: Coordinate = Coordinate::new(51.505, -0.09);

    struct NeverResolves;

    impl LocationSource for NeverResolves {
        async fn current_position(&self) -> Result<Coordinate, LocationError> {
            std::future::pending().await
        }
    }

    struct Denied;

    impl LocationSource for Denied {
        async fn current_position(&self) -> Result<Coordinate, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn test_device_fix_wins() {
        let at = Coordinate::new(35.6892, 51.389);
        let outcome = acquire(&FixedLocation(at), Duration::from_secs(5), FALLBACK).await;
        assert_eq!(outcome.fix.coordinate, at);
        assert_eq!(outcome.fix.source, FixSource::Device);
        assert!(outcome.advisory.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_with_warning() {
        let timeout = Duration::from_millis(5000);
        let outcome = acquire(&NeverResolves, timeout, FALLBACK).await;
        assert_eq!(outcome.fix.coordinate, FALLBACK);
        assert!(outcome.fix.is_fallback());
        assert_eq!(outcome.advisory, Some(EditorError::GeolocationTimeout(timeout)));
    }

    #[tokio::test]
    async fn test_unavailable_and_denied_fall_back() {
        let outcome = acquire(&NoLocation, Duration::from_secs(1), FALLBACK).await;
        assert_eq!(outcome.fix.coordinate, FALLBACK);
        assert!(matches!(
            outcome.advisory,
            Some(EditorError::GeolocationUnavailable(_))
        ));

        let outcome = acquire(&Denied, Duration::from_secs(1), FALLBACK).await;
        assert!(outcome.fix.is_fallback());
        assert_eq!(
            outcome.advisory,
            Some(EditorError::GeolocationUnavailable(
                "location permission denied".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_invalid_device_fix_is_rejected() {
        let outcome = acquire(
            &FixedLocation(Coordinate::new(120.0, 0.0)),
            Duration::from_secs(1),
            FALLBACK,
        )
        .await;
        assert!(outcome.fix.is_fallback());
        assert!(outcome.advisory.is_some());
    }
}
