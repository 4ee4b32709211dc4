//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod stream_hub;
pub mod test_dependencies;
pub mod traits;

pub use deps::{PlacesAdapter, ServerDeps};
pub use stream_hub::StreamHub;
pub use test_dependencies::{
    place, InMemoryEngagementStore, MockGeolocator, MockPlacesService, TestDependencies,
};
pub use traits::*;
