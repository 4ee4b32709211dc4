// Business domains
pub mod auth;
pub mod categories;
pub mod engagement;
pub mod places;
pub mod profiles;
pub mod resources;
