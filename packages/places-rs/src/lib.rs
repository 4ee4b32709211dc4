// Thin client for the Google Places web service.
// https://developers.google.com/maps/documentation/places/web-service

use std::time::Duration;

pub mod models;
use reqwest::{header, Client};
use thiserror::Error;
use tracing::{debug, warn};

pub use crate::models::{
    Geometry, LatLng, NearbySearchRequest, NearbySearchResponse, OpeningHours, Photo, PhotoData,
    PlaceDetailsResponse, PlaceResult, PlacesStatus,
};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

const DETAIL_FIELDS: &str = "place_id,name,formatted_address,formatted_phone_number,\
international_phone_number,geometry,opening_hours,photos,rating,types";

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("places request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("places service returned {status}: {message}")]
    Status {
        status: PlacesStatus,
        message: String,
    },

    #[error("places service returned HTTP {0}")]
    Http(u16),
}

#[derive(Debug, Clone)]
pub struct PlacesOptions {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl PlacesOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacesService {
    options: PlacesOptions,
    client: Client,
}

impl PlacesService {
    pub fn new(options: PlacesOptions) -> Self {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .unwrap_or_default();
        Self { options, client }
    }

    /// Nearby search around a point. `ZERO_RESULTS` yields an empty list.
    pub async fn nearby_search(
        &self,
        request: &NearbySearchRequest,
    ) -> Result<Vec<PlaceResult>, PlacesError> {
        let url = self.nearby_search_url(request);
        debug!(
            place_type = ?request.place_type,
            keyword = ?request.keyword,
            radius_m = request.radius_m,
            "Places nearby search"
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(http_status = %status, body = %body, "Places nearby search failed");
            return Err(PlacesError::Http(status.as_u16()));
        }

        let body = response.json::<NearbySearchResponse>().await?;
        match body.status {
            PlacesStatus::Ok => Ok(body.results),
            PlacesStatus::ZeroResults => Ok(Vec::new()),
            other => Err(PlacesError::Status {
                status: other,
                message: body.error_message.unwrap_or_default(),
            }),
        }
    }

    /// Full details for one place.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceResult, PlacesError> {
        let url = format!(
            "{base}/details/json?place_id={id}&fields={fields}&key={key}",
            base = self.options.base_url,
            id = urlencoding::encode(place_id),
            fields = DETAIL_FIELDS,
            key = urlencoding::encode(&self.options.api_key),
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Http(status.as_u16()));
        }

        let body = response.json::<PlaceDetailsResponse>().await?;
        match (body.status, body.result) {
            (PlacesStatus::Ok, Some(result)) => Ok(result),
            (PlacesStatus::Ok, None) => Err(PlacesError::Status {
                status: PlacesStatus::NotFound,
                message: format!("no details for {}", place_id),
            }),
            (other, _) => Err(PlacesError::Status {
                status: other,
                message: body.error_message.unwrap_or_default(),
            }),
        }
    }

    /// Fetch a photo by reference. The provider answers with a redirect that
    /// reqwest follows to the image itself.
    pub async fn fetch_photo(
        &self,
        photo_reference: &str,
        max_width: u32,
    ) -> Result<PhotoData, PlacesError> {
        let url = format!(
            "{base}/photo?maxwidth={w}&photo_reference={r}&key={key}",
            base = self.options.base_url,
            w = max_width,
            r = urlencoding::encode(photo_reference),
            key = urlencoding::encode(&self.options.api_key),
        );

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Http(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?;

        Ok(PhotoData {
            content_type,
            bytes,
        })
    }

    fn nearby_search_url(&self, request: &NearbySearchRequest) -> String {
        let mut url = format!(
            "{base}/nearbysearch/json?location={lat},{lng}&radius={radius}&key={key}",
            base = self.options.base_url,
            lat = request.location.lat,
            lng = request.location.lng,
            radius = request.radius_m,
            key = urlencoding::encode(&self.options.api_key),
        );
        if let Some(place_type) = &request.place_type {
            url.push_str("&type=");
            url.push_str(&urlencoding::encode(place_type));
        }
        if let Some(keyword) = &request.keyword {
            url.push_str("&keyword=");
            url.push_str(&urlencoding::encode(keyword));
        }
        url
    }
}

/// Public Google Maps directions link between two points.
pub fn directions_url(origin: LatLng, destination: LatLng) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}",
        origin.lat, origin.lng, destination.lat, destination.lng
    )
}
