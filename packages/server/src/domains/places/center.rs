//! Where to search from.
//!
//! The member's position is asked for once and bounded by a timeout. Denial,
//! failure and timeout all fall back to the configured default center.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::common::{geocode_city, Coordinates};
use crate::kernel::{BaseGeolocator, GeolocationError};

/// Default bound on a single geolocation attempt.
pub const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    PermissionDenied,
    Unavailable,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CenterSource {
    Device,
    Fallback { reason: FallbackReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CenterResolution {
    pub center: Coordinates,
    pub source: CenterSource,
}

impl CenterResolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, CenterSource::Fallback { .. })
    }

    /// Notice text for a fallback center.
    pub fn notice(&self) -> Option<&'static str> {
        match self.source {
            CenterSource::Device => None,
            CenterSource::Fallback {
                reason: FallbackReason::PermissionDenied,
            } => Some("Location access denied. Showing resources near the default location."),
            CenterSource::Fallback { .. } => {
                Some("Could not determine your location. Showing resources near the default location.")
            }
        }
    }
}

/// Ask the geolocator once, falling back to `default` on any failure.
pub async fn resolve_center(
    geolocator: &dyn BaseGeolocator,
    timeout: Duration,
    default: Coordinates,
) -> CenterResolution {
    let reason = match tokio::time::timeout(timeout, geolocator.locate()).await {
        Ok(Ok(center)) => {
            debug!(lat = center.lat, lng = center.lng, "Using member position");
            return CenterResolution {
                center,
                source: CenterSource::Device,
            };
        }
        Ok(Err(GeolocationError::PermissionDenied)) => FallbackReason::PermissionDenied,
        Ok(Err(GeolocationError::Unavailable(detail))) => {
            info!(detail = %detail, "Position unavailable, using default center");
            FallbackReason::Unavailable
        }
        Err(_) => {
            info!(timeout_ms = timeout.as_millis() as u64, "Geolocation timed out, using default center");
            FallbackReason::TimedOut
        }
    };

    CenterResolution {
        center: default,
        source: CenterSource::Fallback { reason },
    }
}

/// Position the client already determined, or denial when it sent none.
pub struct ClientPosition(pub Option<Coordinates>);

#[async_trait]
impl BaseGeolocator for ClientPosition {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        self.0.ok_or(GeolocationError::PermissionDenied)
    }
}

/// Position of a named city, geocoded through Nominatim.
pub struct CityGeolocator {
    city: String,
}

impl CityGeolocator {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

#[async_trait]
impl BaseGeolocator for CityGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        geocode_city(&self.city)
            .await
            .map(|location| location.coordinates)
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))
    }
}
