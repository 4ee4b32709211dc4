// HTTP server setup (Axum + SSE)
pub mod app;
pub mod error;
pub mod middleware;
pub mod notice;
pub mod routes;

pub use app::*;
