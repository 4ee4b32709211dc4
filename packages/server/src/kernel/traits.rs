// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only. Business rules (nearest-per-category,
// like toggling, comment authorship) live in domain code that calls them.
//
// Naming convention: Base* for trait names (e.g., BasePlacesService)

use anyhow::Result;
use async_trait::async_trait;
use places::{NearbySearchRequest, PhotoData, PlaceResult};
use thiserror::Error;

use crate::common::{CommentId, Coordinates, ResourceKey};
use crate::domains::engagement::models::{Comment, LikeRecord, NewComment};

// =============================================================================
// Places Trait (Infrastructure - external points of interest)
// =============================================================================

#[async_trait]
pub trait BasePlacesService: Send + Sync {
    /// Nearby search; an empty result set is `Ok(vec![])`, not an error.
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<Vec<PlaceResult>>;

    /// Details (phone, weekday opening hours) for one place.
    async fn place_details(&self, place_id: &str) -> Result<PlaceResult>;

    /// Photo bytes for a photo reference taken from a place result.
    async fn fetch_photo(&self, photo_reference: &str, max_width: u32) -> Result<PhotoData>;
}

// =============================================================================
// Geolocation Trait (Infrastructure - where is the member?)
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait BaseGeolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

// =============================================================================
// Engagement Store Trait (Infrastructure - likes and comments)
// =============================================================================

/// Storage for likes and comments, keyed by resource.
///
/// Mirrors a document store: whole-record reads and overwrites for likes,
/// append-with-generated-id, overwrite and delete for comments. There is no
/// compare-and-swap, so concurrent like toggles are last-writer-wins.
#[async_trait]
pub trait BaseEngagementStore: Send + Sync {
    /// Current like record; an untouched resource reads as empty.
    async fn likes(&self, resource: &ResourceKey) -> Result<LikeRecord>;

    /// Overwrite the like record.
    async fn put_likes(&self, resource: &ResourceKey, record: &LikeRecord) -> Result<()>;

    /// Comments in creation order.
    async fn comments(&self, resource: &ResourceKey) -> Result<Vec<Comment>>;

    async fn find_comment(&self, resource: &ResourceKey, id: CommentId)
        -> Result<Option<Comment>>;

    /// Append a comment; the store assigns the id and timestamps.
    async fn append_comment(&self, resource: &ResourceKey, comment: NewComment)
        -> Result<Comment>;

    /// Overwrite text and `updated_at` of an existing comment, keeping its id.
    async fn overwrite_comment(
        &self,
        resource: &ResourceKey,
        id: CommentId,
        text: &str,
    ) -> Result<Comment>;

    async fn delete_comment(&self, resource: &ResourceKey, id: CommentId) -> Result<()>;
}
