pub mod binding;
pub mod events;
pub mod models;
pub mod store;

pub use binding::{EngagementBinding, EngagementError};
pub use events::{topic, EngagementEvent};
pub use models::*;
pub use store::PostgresEngagementStore;
