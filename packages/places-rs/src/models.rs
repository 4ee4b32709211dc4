use serde::{Deserialize, Serialize};

/// Status codes returned in the body of every Places web service response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacesStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    NotFound,
    UnknownError,
    #[serde(other)]
    Unrecognized,
}

impl PlacesStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacesStatus::Ok => "OK",
            PlacesStatus::ZeroResults => "ZERO_RESULTS",
            PlacesStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            PlacesStatus::RequestDenied => "REQUEST_DENIED",
            PlacesStatus::InvalidRequest => "INVALID_REQUEST",
            PlacesStatus::NotFound => "NOT_FOUND",
            PlacesStatus::UnknownError => "UNKNOWN_ERROR",
            PlacesStatus::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for PlacesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Photo {
    pub photo_reference: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A single place as returned by nearby search or place details.
///
/// Nearby search fills `vicinity`; details fills `formatted_address`, the phone
/// number and `weekday_text` opening hours.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl PlaceResult {
    /// Best available address line.
    pub fn address(&self) -> Option<&str> {
        self.formatted_address
            .as_deref()
            .or(self.vicinity.as_deref())
    }

    /// Best available phone number.
    pub fn phone(&self) -> Option<&str> {
        self.formatted_phone_number
            .as_deref()
            .or(self.international_phone_number.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: PlacesStatus,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    pub status: PlacesStatus,
    #[serde(default)]
    pub result: Option<PlaceResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Parameters of a nearby search. At least one of `place_type` and `keyword`
/// should be set or the provider answers `INVALID_REQUEST`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchRequest {
    pub location: LatLng,
    pub radius_m: u32,
    pub place_type: Option<String>,
    pub keyword: Option<String>,
}

/// Raw photo bytes with the content type reported by the provider.
#[derive(Debug, Clone)]
pub struct PhotoData {
    pub content_type: String,
    pub bytes: bytes::Bytes,
}
