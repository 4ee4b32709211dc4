//! Test fixtures for creating test data.

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use sqlx::PgPool;
use sweekar_core::domains::auth::{IdentityClaims, Member};
use uuid::Uuid;

use super::{TEST_IDENTITY_ISSUER, TEST_IDENTITY_SECRET};

/// Mint an identity token the way the identity provider would.
pub fn identity_token(subject: &str, name: Option<&str>) -> String {
    let claims = IdentityClaims {
        sub: subject.to_string(),
        name: name.map(String::from),
        email: Some(format!("{}@example.org", subject)),
        picture: None,
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
        iss: TEST_IDENTITY_ISSUER.to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_IDENTITY_SECRET.as_bytes()),
    )
    .expect("Failed to encode identity token")
}

/// Identity subject unique to one test, so tests sharing the database never
/// collide on the same member.
pub fn unique_subject(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// Create a member directly in the database
pub async fn create_test_member(pool: &PgPool, name: &str) -> Result<Member> {
    Member::upsert_from_identity(
        &unique_subject("member"),
        Some(name),
        None,
        None,
        pool,
    )
    .await
}

/// Build a JSON request, optionally with a bearer token.
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    }
}

/// Read a response body as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
