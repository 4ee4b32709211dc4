// Sweekar - community resource directory API
//
// Lets signed-in members find nearby support resources by category, page through
// them, like and comment on them, and keep a profile.
//
// Domains live under domains/*, infrastructure traits and test doubles under kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
