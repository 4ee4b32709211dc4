// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use places::{
    Geometry, LatLng, NearbySearchRequest, PhotoData, PlaceResult, PlacesError, PlacesStatus,
};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BaseEngagementStore, BaseGeolocator, BasePlacesService, GeolocationError, ServerDeps,
    StreamHub,
};
use crate::common::{CommentId, Coordinates, ResourceKey, DEFAULT_CENTER};
use crate::domains::auth::{JwtService, SessionRegistry};
use crate::domains::engagement::models::{Comment, LikeRecord, NewComment};

/// A minimal place as the provider would return it from nearby search.
pub fn place(place_id: &str, name: &str, lat: f64, lng: f64) -> PlaceResult {
    PlaceResult {
        place_id: place_id.to_string(),
        name: name.to_string(),
        vicinity: None,
        formatted_address: None,
        formatted_phone_number: None,
        international_phone_number: None,
        geometry: Geometry {
            location: LatLng { lat, lng },
        },
        opening_hours: None,
        photos: Vec::new(),
        rating: None,
        types: Vec::new(),
    }
}

// =============================================================================
// Mock Places Service
// =============================================================================

/// Places double keyed by query: the request's keyword, or its place type when
/// there is no keyword. Unknown queries answer with no results.
#[derive(Default)]
pub struct MockPlacesService {
    results: HashMap<String, Vec<PlaceResult>>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    panics: HashSet<String>,
    details: HashMap<String, PlaceResult>,
    photos: HashMap<String, PhotoData>,
    nearby_calls: Mutex<Vec<NearbySearchRequest>>,
    completed: AtomicUsize,
}

impl MockPlacesService {
    pub fn new() -> Self {
        Self::default()
    }

    fn query_key(request: &NearbySearchRequest) -> String {
        request
            .keyword
            .clone()
            .or_else(|| request.place_type.clone())
            .unwrap_or_default()
    }

    pub fn with_results(mut self, query: &str, results: Vec<PlaceResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn with_failure(mut self, query: &str, message: &str) -> Self {
        self.failures.insert(query.to_string(), message.to_string());
        self
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn with_panic(mut self, query: &str) -> Self {
        self.panics.insert(query.to_string());
        self
    }

    pub fn with_details(mut self, place: PlaceResult) -> Self {
        self.details.insert(place.place_id.clone(), place);
        self
    }

    pub fn with_photo(mut self, reference: &str, content_type: &str, bytes: &'static [u8]) -> Self {
        self.photos.insert(
            reference.to_string(),
            PhotoData {
                content_type: content_type.to_string(),
                bytes: bytes::Bytes::from_static(bytes),
            },
        );
        self
    }

    /// Every nearby search request received, in arrival order.
    pub fn nearby_calls(&self) -> Vec<NearbySearchRequest> {
        self.nearby_calls.lock().unwrap().clone()
    }

    /// Nearby searches that ran to completion (not aborted mid-delay).
    pub fn completed_searches(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn not_found(subject: &str) -> anyhow::Error {
        PlacesError::Status {
            status: PlacesStatus::NotFound,
            message: format!("{} not found", subject),
        }
        .into()
    }
}

#[async_trait]
impl BasePlacesService for MockPlacesService {
    async fn nearby_search(&self, request: &NearbySearchRequest) -> Result<Vec<PlaceResult>> {
        self.nearby_calls.lock().unwrap().push(request.clone());
        let key = Self::query_key(request);

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.panics.contains(&key) {
            panic!("mock places panic for {}", key);
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failures.get(&key) {
            return Err(anyhow!("{}", message));
        }
        Ok(self.results.get(&key).cloned().unwrap_or_default())
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceResult> {
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| Self::not_found(place_id))
    }

    async fn fetch_photo(&self, photo_reference: &str, _max_width: u32) -> Result<PhotoData> {
        self.photos
            .get(photo_reference)
            .cloned()
            .ok_or_else(|| Self::not_found(photo_reference))
    }
}

// =============================================================================
// Mock Geolocator
// =============================================================================

pub struct MockGeolocator {
    result: Result<Coordinates, GeolocationError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockGeolocator {
    pub fn returning(result: Result<Coordinates, GeolocationError>) -> Self {
        Self {
            result,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseGeolocator for MockGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

// =============================================================================
// In-memory Engagement Store
// =============================================================================

/// Engagement store held in memory, with switchable write failures.
#[derive(Default)]
pub struct InMemoryEngagementStore {
    likes: Mutex<HashMap<ResourceKey, LikeRecord>>,
    comments: Mutex<HashMap<ResourceKey, Vec<Comment>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryEngagementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_likes(&self, resource: &ResourceKey, record: LikeRecord) {
        self.likes.lock().unwrap().insert(resource.clone(), record);
    }

    /// Make every subsequent write fail until switched back off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn begin_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("injected write failure"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BaseEngagementStore for InMemoryEngagementStore {
    async fn likes(&self, resource: &ResourceKey) -> Result<LikeRecord> {
        Ok(self
            .likes
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_likes(&self, resource: &ResourceKey, record: &LikeRecord) -> Result<()> {
        self.begin_write()?;
        self.likes
            .lock()
            .unwrap()
            .insert(resource.clone(), record.clone());
        Ok(())
    }

    async fn comments(&self, resource: &ResourceKey) -> Result<Vec<Comment>> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_comment(
        &self,
        resource: &ResourceKey,
        id: CommentId,
    ) -> Result<Option<Comment>> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(resource)
            .and_then(|all| all.iter().find(|c| c.id == id).cloned()))
    }

    async fn append_comment(&self, resource: &ResourceKey, comment: NewComment) -> Result<Comment> {
        self.begin_write()?;
        let now = Utc::now();
        let stored = Comment {
            id: CommentId::new(),
            author_id: comment.author_id,
            author_name: comment.author_name,
            text: comment.text,
            created_at: now,
            updated_at: now,
        };
        self.comments
            .lock()
            .unwrap()
            .entry(resource.clone())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn overwrite_comment(
        &self,
        resource: &ResourceKey,
        id: CommentId,
        text: &str,
    ) -> Result<Comment> {
        self.begin_write()?;
        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .get_mut(resource)
            .and_then(|all| all.iter_mut().find(|c| c.id == id))
            .ok_or_else(|| anyhow!("comment {} not found on {}", id, resource))?;
        comment.text = text.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, resource: &ResourceKey, id: CommentId) -> Result<()> {
        self.begin_write()?;
        if let Some(all) = self.comments.lock().unwrap().get_mut(resource) {
            all.retain(|c| c.id != id);
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Mocks plus the settings needed to assemble a `ServerDeps` around a test pool.
pub struct TestDependencies {
    pub places: Arc<MockPlacesService>,
    pub engagement: Arc<InMemoryEngagementStore>,
    pub jwt_service: Arc<JwtService>,
    pub sessions: SessionRegistry,
    pub stream_hub: StreamHub,
    pub geolocation_timeout: Duration,
}

impl TestDependencies {
    pub fn new(jwt_service: JwtService) -> Self {
        Self {
            places: Arc::new(MockPlacesService::new()),
            engagement: Arc::new(InMemoryEngagementStore::new()),
            jwt_service: Arc::new(jwt_service),
            sessions: SessionRegistry::new(),
            stream_hub: StreamHub::new(),
            geolocation_timeout: Duration::from_millis(200),
        }
    }

    pub fn with_places(mut self, places: MockPlacesService) -> Self {
        self.places = Arc::new(places);
        self
    }

    pub fn server_deps(&self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            self.places.clone(),
            self.engagement.clone(),
            self.jwt_service.clone(),
            self.sessions.clone(),
            self.stream_hub.clone(),
            10_000,
            self.geolocation_timeout,
            DEFAULT_CENTER,
        )
    }
}
