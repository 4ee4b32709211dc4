use std::sync::Arc;

use places::{NearbySearchRequest, PhotoData, PlacesError, PlacesStatus};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::common::{Coordinates, GeoError, ResourceKey};
use crate::domains::categories::Category;
use crate::domains::places::Resource;
use crate::kernel::BasePlacesService;

/// Default search radius around the center, in meters.
pub const DEFAULT_RADIUS_M: u32 = 10_000;

/// Photo width requested from the provider.
pub const PHOTO_MAX_WIDTH: u32 = 400;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(#[from] GeoError),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("unusable place from provider: {0}")]
    InvalidResource(String),

    #[error("places provider failed: {0}")]
    Provider(String),
}

impl LookupError {
    fn from_provider(e: anyhow::Error, subject: &str) -> Self {
        match e.downcast_ref::<PlacesError>() {
            Some(PlacesError::Status {
                status: PlacesStatus::NotFound | PlacesStatus::InvalidRequest,
                ..
            }) => LookupError::NotFound(subject.to_string()),
            _ => LookupError::Provider(e.to_string()),
        }
    }
}

/// Category-aware queries against the places provider.
#[derive(Clone)]
pub struct PlaceLookup {
    places: Arc<dyn BasePlacesService>,
    radius_m: u32,
}

impl PlaceLookup {
    pub fn new(places: Arc<dyn BasePlacesService>, radius_m: u32) -> Self {
        Self { places, radius_m }
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    fn request(&self, center: Coordinates, category: &Category) -> NearbySearchRequest {
        NearbySearchRequest {
            location: center.into(),
            radius_m: self.radius_m,
            place_type: category.place_type.map(String::from),
            keyword: category.keyword.map(String::from),
        }
    }

    /// Nearest match for a category, or `None` when the provider has nothing
    /// in range.
    #[instrument(skip(self, category), fields(category = %category.key))]
    pub async fn nearest(
        &self,
        center: Coordinates,
        category: &Category,
    ) -> Result<Option<Resource>, LookupError> {
        let results = self
            .places
            .nearby_search(&self.request(center, category))
            .await
            .map_err(|e| LookupError::from_provider(e, category.key))?;

        let nearest = results.into_iter().find_map(|place| {
            Resource::from_place(place)
                .map_err(|e| warn!(error = %e, "Skipping place"))
                .ok()
        });
        debug!(found = nearest.is_some(), "Nearest lookup finished");
        Ok(nearest)
    }

    /// Every match for a category, in provider order.
    #[instrument(skip(self, category), fields(category = %category.key))]
    pub async fn nearby(
        &self,
        center: Coordinates,
        category: &Category,
    ) -> Result<Vec<Resource>, LookupError> {
        let results = self
            .places
            .nearby_search(&self.request(center, category))
            .await
            .map_err(|e| LookupError::from_provider(e, category.key))?;

        let resources: Vec<Resource> = results
            .into_iter()
            .filter_map(|place| match Resource::from_place(place) {
                Ok(resource) => Some(resource),
                Err(e) => {
                    warn!(error = %e, "Skipping place");
                    None
                }
            })
            .collect();
        debug!(count = resources.len(), "Nearby lookup finished");
        Ok(resources)
    }

    /// Full details (phone, weekly hours) for one resource.
    #[instrument(skip(self), fields(resource = %key))]
    pub async fn details(&self, key: &ResourceKey) -> Result<Resource, LookupError> {
        let place = self
            .places
            .place_details(key.as_str())
            .await
            .map_err(|e| LookupError::from_provider(e, key.as_str()))?;
        Resource::from_place(place)
    }

    pub async fn photo(&self, reference: &str) -> Result<PhotoData, LookupError> {
        self.places
            .fetch_photo(reference, PHOTO_MAX_WIDTH)
            .await
            .map_err(|e| LookupError::from_provider(e, reference))
    }
}
