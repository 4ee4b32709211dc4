//! Server dependencies for routes and domain code (using traits for testability)
//!
//! This module provides the central dependency container. External services sit
//! behind the `Base*` traits so tests can swap in the doubles from
//! `test_dependencies`.

use anyhow::Result;
use async_trait::async_trait;
use places::{NearbySearchRequest, PhotoData, PlaceResult, PlacesService};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::common::Coordinates;
use crate::domains::auth::{JwtService, SessionRegistry};
use crate::domains::places::PlaceLookup;
use crate::kernel::{stream_hub::StreamHub, BaseEngagementStore, BasePlacesService};

// =============================================================================
// PlacesService Adapter (implements BasePlacesService trait)
// =============================================================================

/// Wrapper around PlacesService that implements BasePlacesService trait.
///
/// Errors keep their `PlacesError` type inside the `anyhow::Error` so callers
/// can tell a missing place from a failing provider.
pub struct PlacesAdapter(pub Arc<PlacesService>);

impl PlacesAdapter {
    pub fn new(service: Arc<PlacesService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BasePlacesService for PlacesAdapter {
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<Vec<PlaceResult>> {
        self.0.nearby_search(request).await.map_err(Into::into)
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceResult> {
        self.0.place_details(place_id).await.map_err(Into::into)
    }

    async fn fetch_photo(&self, photo_reference: &str, max_width: u32) -> Result<PhotoData> {
        self.0
            .fetch_photo(photo_reference, max_width)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to routes (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub places: Arc<dyn BasePlacesService>,
    /// Likes and comments
    pub engagement: Arc<dyn BaseEngagementStore>,
    /// JWT service for identity verification and session tokens
    pub jwt_service: Arc<JwtService>,
    pub sessions: SessionRegistry,
    /// In-process pub/sub hub for real-time streaming to SSE endpoints
    pub stream_hub: StreamHub,
    pub search_radius_m: u32,
    pub geolocation_timeout: Duration,
    /// Used when the member's position cannot be determined
    pub default_center: Coordinates,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db_pool: PgPool,
        places: Arc<dyn BasePlacesService>,
        engagement: Arc<dyn BaseEngagementStore>,
        jwt_service: Arc<JwtService>,
        sessions: SessionRegistry,
        stream_hub: StreamHub,
        search_radius_m: u32,
        geolocation_timeout: Duration,
        default_center: Coordinates,
    ) -> Self {
        Self {
            db_pool,
            places,
            engagement,
            jwt_service,
            sessions,
            stream_hub,
            search_radius_m,
            geolocation_timeout,
            default_center,
        }
    }

    pub fn place_lookup(&self) -> PlaceLookup {
        PlaceLookup::new(self.places.clone(), self.search_radius_m)
    }
}
