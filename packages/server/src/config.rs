use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::common::Coordinates;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub google_maps_api_key: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub identity_token_secret: String,
    pub identity_issuer: String,
    pub allowed_origins: Vec<String>,
    pub search_radius_m: u32,
    pub geolocation_timeout: Duration,
    pub default_center: Coordinates,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let default_lat: f64 = env::var("DEFAULT_CENTER_LAT")
            .unwrap_or_else(|_| "20.5937".to_string())
            .parse()
            .context("DEFAULT_CENTER_LAT must be a number")?;
        let default_lng: f64 = env::var("DEFAULT_CENTER_LNG")
            .unwrap_or_else(|_| "78.9629".to_string())
            .parse()
            .context("DEFAULT_CENTER_LNG must be a number")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .context("GOOGLE_MAPS_API_KEY must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "sweekar".to_string()),
            identity_token_secret: env::var("IDENTITY_TOKEN_SECRET")
                .context("IDENTITY_TOKEN_SECRET must be set")?,
            identity_issuer: env::var("IDENTITY_ISSUER")
                .context("IDENTITY_ISSUER must be set")?,
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            search_radius_m: env::var("SEARCH_RADIUS_METERS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .context("SEARCH_RADIUS_METERS must be a positive integer")?,
            geolocation_timeout: Duration::from_secs(
                env::var("GEOLOCATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("GEOLOCATION_TIMEOUT_SECS must be a number of seconds")?,
            ),
            default_center: Coordinates::new(default_lat, default_lng)
                .context("DEFAULT_CENTER_LAT/DEFAULT_CENTER_LNG out of range")?,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
