// HTTP routes
pub mod auth;
pub mod categories;
pub mod engagement;
pub mod health;
pub mod profile;
pub mod resources;
pub mod stream;

pub use auth::*;
pub use categories::*;
pub use engagement::*;
pub use health::*;
pub use profile::*;
pub use resources::*;
pub use stream::*;
