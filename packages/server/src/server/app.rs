//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use places::{PlacesOptions, PlacesService};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::domains::auth::{JwtService, SessionRegistry};
use crate::domains::engagement::PostgresEngagementStore;
use crate::kernel::{PlacesAdapter, ServerDeps, StreamHub};
use crate::server::middleware::require_session;
use crate::server::routes::{
    add_comment_handler, categories_handler, category_resources_handler, delete_comment_handler,
    edit_comment_handler, engagement_handler, get_profile_handler, health_handler,
    nearby_handler, photo_handler, put_profile_handler, resource_detail_handler,
    session_handler, sign_in_handler, sign_out_handler, stream_handler, toggle_like_handler,
};

/// Production dependencies built from configuration.
pub fn build_deps(pool: PgPool, config: &Config) -> ServerDeps {
    let places = Arc::new(PlacesService::new(PlacesOptions::new(
        config.google_maps_api_key.clone(),
    )));

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        &config.identity_token_secret,
        config.identity_issuer.clone(),
    ));

    ServerDeps::new(
        pool.clone(),
        Arc::new(PlacesAdapter::new(places)),
        Arc::new(PostgresEngagementStore::new(pool)),
        jwt_service,
        SessionRegistry::new(),
        StreamHub::new(),
        config.search_radius_m,
        config.geolocation_timeout,
        config.default_center,
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Any origin when none are configured (development)
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
///
/// Everything under /api except sign-in sits behind the session guard.
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let deps = Arc::new(deps);

    let deps_for_guard = deps.clone();
    let session_layer = middleware::from_fn(move |req, next| {
        require_session(deps_for_guard.clone(), req, next)
    });

    Router::new()
        // Protected routes
        .route("/api/categories", get(categories_handler))
        .route("/api/nearby", get(nearby_handler))
        .route(
            "/api/categories/:key/resources",
            get(category_resources_handler),
        )
        .route("/api/resources/:key", get(resource_detail_handler))
        .route("/api/resources/:key/engagement", get(engagement_handler))
        .route("/api/resources/:key/like", post(toggle_like_handler))
        .route("/api/resources/:key/comments", post(add_comment_handler))
        .route(
            "/api/resources/:key/comments/:id",
            put(edit_comment_handler).delete(delete_comment_handler),
        )
        .route("/api/resources/:key/stream", get(stream_handler))
        .route("/api/photos/:reference", get(photo_handler))
        .route(
            "/api/profile",
            get(get_profile_handler).put(put_profile_handler),
        )
        .route_layer(session_layer.clone())
        // Public routes; sign-in is the only unguarded method on the session path
        .route("/health", get(health_handler))
        .route(
            "/api/auth/session",
            get(session_handler)
                .delete(sign_out_handler)
                .route_layer(session_layer)
                .post(sign_in_handler),
        )
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(deps))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
