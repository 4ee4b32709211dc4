//! Place lookups against the external places provider, and resolution of the
//! point lookups are made from.

pub mod center;
pub mod lookup;
pub mod models;

pub use center::{
    resolve_center, CenterResolution, CenterSource, CityGeolocator, ClientPosition,
    FallbackReason, DEFAULT_GEOLOCATION_TIMEOUT,
};
pub use lookup::{LookupError, PlaceLookup, DEFAULT_RADIUS_M, PHOTO_MAX_WIDTH};
pub use models::Resource;
