use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Fallback map center used when the member's position is unavailable.
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 20.5937,
    lng: 78.9629,
};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Both halves of an optional query pair, validated. `None` when either is missing.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Result<Self, GeoError>> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)),
            _ => None,
        }
    }

    pub fn coarsened(&self) -> Self {
        let (lat, lng) = coarsen_coords(self.lat, self.lng);
        Self { lat, lng }
    }

    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        calculate_distance_km(self.lat, self.lng, other.lat, other.lng)
    }
}

impl From<Coordinates> for places::LatLng {
    fn from(c: Coordinates) -> Self {
        places::LatLng {
            lat: c.lat,
            lng: c.lng,
        }
    }
}

impl From<places::LatLng> for Coordinates {
    fn from(l: places::LatLng) -> Self {
        Coordinates {
            lat: l.lat,
            lng: l.lng,
        }
    }
}

/// Nominatim API response for geocoding
#[derive(Debug, Deserialize)]
struct NominatimResponse {
    lat: String,
    lon: String,
    display_name: String,
}

/// Geocoded location with coarse precision
#[derive(Debug, Clone)]
pub struct GeocodedLocation {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// Geocode a free-form city name using Nominatim (OpenStreetMap).
///
/// Coordinates come back coarsened to 2 decimal places (about 1 km).
#[instrument]
pub async fn geocode_city(city: &str) -> Result<GeocodedLocation> {
    let query = city.trim();
    if query.is_empty() {
        return Err(anyhow!("City name is empty"));
    }
    let url = format!(
        "https://nominatim.openstreetmap.org/search?q={}&format=json&limit=1",
        urlencoding::encode(query)
    );

    debug!("Geocoding city: {}", query);

    let client = reqwest::Client::new();
    let response: Vec<NominatimResponse> = client
        .get(&url)
        .header("User-Agent", "Sweekar/1.0 (Community Resource Directory)")
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, city = %query, "Geocoding API request failed");
            anyhow!("Geocoding API request failed: {}", e)
        })?
        .json()
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to parse geocoding response");
            anyhow!("Failed to parse geocoding response: {}", e)
        })?;

    let result = response.first().ok_or_else(|| {
        warn!(city = %query, "City not found by geocoding API");
        anyhow!("City not found: {}", query)
    })?;

    let lat: f64 = result
        .lat
        .parse()
        .map_err(|e| anyhow!("Invalid latitude in response: {}", e))?;
    let lng: f64 = result
        .lon
        .parse()
        .map_err(|e| anyhow!("Invalid longitude in response: {}", e))?;

    let coordinates = Coordinates::new(lat, lng)?.coarsened();
    debug!(
        "Geocoded {} -> ({}, {})",
        query, coordinates.lat, coordinates.lng
    );

    Ok(GeocodedLocation {
        coordinates,
        display_name: result.display_name.clone(),
    })
}

/// Round to 2 decimal places, about 1 km.
pub fn coarsen_coords(lat: f64, lng: f64) -> (f64, f64) {
    ((lat * 100.0).round() / 100.0, (lng * 100.0).round() / 100.0)
}

/// Great-circle distance in kilometers (haversine).
pub fn calculate_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(12.97, 77.59).is_ok());
        assert_eq!(
            Coordinates::new(91.0, 0.0),
            Err(GeoError::Latitude(91.0))
        );
        assert_eq!(
            Coordinates::new(0.0, -180.5),
            Err(GeoError::Longitude(-180.5))
        );
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_from_parts_requires_both() {
        assert!(Coordinates::from_parts(Some(1.0), None).is_none());
        assert!(Coordinates::from_parts(None, None).is_none());
        assert!(matches!(
            Coordinates::from_parts(Some(1.0), Some(2.0)),
            Some(Ok(_))
        ));
    }

    #[test]
    fn test_coarsen_coords() {
        let (lat, lng) = coarsen_coords(12.971599, 77.594566);
        assert_eq!(lat, 12.97);
        assert_eq!(lng, 77.59);
    }

    #[test]
    fn test_calculate_distance() {
        // Mumbai CST to Bandra, roughly 13 km
        let cst = Coordinates::new(18.94, 72.835).unwrap();
        let bandra = Coordinates::new(19.054, 72.84).unwrap();
        let d = cst.distance_km(&bandra);
        assert!(d > 12.0 && d < 14.0, "got {}", d);
        assert!(cst.distance_km(&cst) < 0.001);
    }

    #[test]
    fn test_default_center_is_valid() {
        assert!(Coordinates::new(DEFAULT_CENTER.lat, DEFAULT_CENTER.lng).is_ok());
    }
}
