// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod id;
pub mod pagination;
pub mod utils;

pub use auth::AuthError;
pub use entity_ids::*;
pub use id::Id;
pub use pagination::{paginate, Page, PAGE_SIZE};
pub use utils::{geocode_city, Coordinates, GeoError, GeocodedLocation, DEFAULT_CENTER};
