//! Resource discovery routes.
//!
//! GET /api/nearby                           nearest resource per nearby category
//! GET /api/categories/:key/resources        paginated resources of one category
//! GET /api/resources/:key                   resource detail
//! GET /api/photos/:reference                proxied place photo

use axum::{
    extract::{Extension, Path, Query},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::common::{paginate, Coordinates, Page, ResourceKey, PAGE_SIZE};
use crate::domains::categories::{self, Category, CategoryGroup};
use crate::domains::places::{
    resolve_center, CenterResolution, CityGeolocator, ClientPosition, Resource,
};
use crate::domains::resources::ResourceAggregator;
use crate::kernel::{BaseGeolocator, ServerDeps};
use crate::server::error::ApiError;
use crate::server::notice::Notice;

const MAX_PHOTO_REFERENCE_LEN: usize = 1024;

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: Option<String>,
    pub page: Option<usize>,
}

/// A resource with distance and directions from the search center.
#[derive(Serialize)]
pub struct ResourceView {
    #[serde(flatten)]
    pub resource: Resource,
    pub distance_km: f64,
    pub directions_url: String,
}

impl ResourceView {
    fn new(resource: Resource, center: Coordinates) -> Self {
        Self {
            distance_km: (resource.distance_km(&center) * 10.0).round() / 10.0,
            directions_url: resource.directions_url(center),
            resource,
        }
    }
}

/// Position from explicit coordinates, else a city name, else none at all.
async fn locate(query: &LocationQuery, deps: &ServerDeps) -> Result<CenterResolution, ApiError> {
    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let geolocator: Box<dyn BaseGeolocator> =
        match (Coordinates::from_parts(query.lat, query.lng), city) {
            (Some(coordinates), _) => Box::new(ClientPosition(Some(coordinates?))),
            (None, Some(city)) => Box::new(CityGeolocator::new(city)),
            (None, None) => Box::new(ClientPosition(None)),
        };

    Ok(resolve_center(geolocator.as_ref(), deps.geolocation_timeout, deps.default_center).await)
}

// =============================================================================
// Home view
// =============================================================================

#[derive(Serialize)]
pub struct NearbyEntry {
    pub category: &'static Category,
    pub resource: ResourceView,
}

#[derive(Serialize)]
pub struct NearbyResponse {
    pub center: CenterResolution,
    pub resources: Vec<NearbyEntry>,
    /// Labels of categories with nothing in range.
    pub empty: Vec<&'static str>,
    pub notices: Vec<Notice>,
}

pub async fn nearby_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let center = locate(&query, &deps).await?;
    let nearby: Vec<&'static Category> = categories::group(CategoryGroup::Nearby).collect();

    let aggregator = ResourceAggregator::new(deps.place_lookup());
    let result = aggregator.run(center.center, &nearby).await;

    let mut notices = Vec::new();
    if let Some(message) = center.notice() {
        notices.push(Notice::warning(message));
    }
    if let Some(message) = result.failure_notice() {
        notices.push(Notice::error(message));
    }

    let resources = result
        .resolved()
        .into_iter()
        .map(|r| NearbyEntry {
            category: r.category,
            resource: ResourceView::new(r.resource.clone(), center.center),
        })
        .collect();

    Ok(Json(NearbyResponse {
        center,
        resources,
        empty: result.empty().iter().map(|c| c.label).collect(),
        notices,
    }))
}

// =============================================================================
// Category list
// =============================================================================

#[derive(Serialize)]
pub struct CategoryResourcesResponse {
    pub category: &'static Category,
    pub heading: String,
    pub center: CenterResolution,
    pub page: Page<ResourceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    pub notices: Vec<Notice>,
}

pub async fn category_resources_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Path(key): Path<String>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<CategoryResourcesResponse>, ApiError> {
    let category = categories::find(&key)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown category: {}", key)))?;
    let center = locate(&query, &deps).await?;

    let resources = deps.place_lookup().nearby(center.center, category).await?;
    let page = paginate(&resources, query.page.unwrap_or(1), PAGE_SIZE)
        .map(|resource| ResourceView::new(resource, center.center));

    let mut notices = Vec::new();
    if let Some(message) = center.notice() {
        notices.push(Notice::warning(message));
    }

    Ok(Json(CategoryResourcesResponse {
        category,
        heading: category.list_heading(),
        center,
        empty_message: (page.total == 0).then(|| category.empty_message()),
        page,
        notices,
    }))
}

// =============================================================================
// Detail and photo
// =============================================================================

#[derive(Serialize)]
pub struct ResourceDetailResponse {
    pub resource: Resource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directions_url: Option<String>,
}

pub async fn resource_detail_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Path(key): Path<String>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ResourceDetailResponse>, ApiError> {
    let key = ResourceKey::parse(&key)?;
    let origin = Coordinates::from_parts(query.lat, query.lng).transpose()?;

    let resource = deps.place_lookup().details(&key).await?;
    let directions_url = origin.map(|origin| resource.directions_url(origin));

    Ok(Json(ResourceDetailResponse {
        resource,
        directions_url,
    }))
}

pub async fn photo_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if reference.is_empty()
        || reference.len() > MAX_PHOTO_REFERENCE_LEN
        || !reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::Validation("Invalid photo reference".to_string()));
    }

    let photo = deps.place_lookup().photo(&reference).await?;
    Ok((
        [
            (header::CONTENT_TYPE, photo.content_type),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        photo.bytes,
    ))
}
