use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domains::auth::{GuardOutcome, SessionGuard};
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;

/// Session middleware for protected routes
///
/// Verifies the session token (Authorization header, or `?token=` for
/// EventSource clients that cannot set headers), subscribes to the session and
/// lets the guard decide. Rendered requests carry the `SessionUser` in
/// extensions; everything else gets 401 with a redirect to sign-in.
pub async fn require_session(
    deps: Arc<ServerDeps>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut guard = match session_of(&request, &deps) {
        Some((session_id, member_id)) => {
            let rx = deps.sessions.subscribe(session_id).await;
            // A token for a session that now belongs to someone else is void
            if rx
                .borrow()
                .as_ref()
                .is_some_and(|user| user.member_id.into_uuid() != member_id)
            {
                SessionGuard::unsubscribed()
            } else {
                SessionGuard::new(rx)
            }
        }
        None => SessionGuard::unsubscribed(),
    };

    match guard.resolve().await {
        GuardOutcome::Render(user) => {
            debug!(member_id = %user.member_id, "Session admitted");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GuardOutcome::Redirect(_) | GuardOutcome::Pending => {
            debug!(path = %request.uri().path(), "No valid session");
            ApiError::Unauthenticated.into_response()
        }
    }
}

/// Session id and member id from a verified token.
fn session_of(request: &Request<Body>, deps: &ServerDeps) -> Option<(Uuid, Uuid)> {
    let token = bearer_token(request).or_else(|| query_token(request))?;
    let claims = deps.jwt_service.verify_token(&token).ok()?;
    let session_id = Uuid::parse_str(&claims.jti).ok()?;
    Some((session_id, claims.member_id))
}

fn bearer_token(request: &Request<Body>) -> Option<String> {
    let auth = request.headers().get("authorization")?.to_str().ok()?;
    auth.strip_prefix("Bearer ").map(|t| t.to_string())
}

fn query_token(request: &Request<Body>) -> Option<String> {
    request.uri().query()?.split('&').find_map(|pair| {
        let value = pair.strip_prefix("token=")?;
        urlencoding::decode(value).ok().map(|v| v.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        let request = Request::builder()
            .header("authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_query_token() {
        let request = Request::builder()
            .uri("/api/resources/p1/stream?since=0&token=abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(query_token(&request).as_deref(), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&request), None);
    }

    #[test]
    fn test_no_token() {
        let request = Request::builder()
            .uri("/api/profile")
            .body(Body::empty())
            .unwrap();
        assert_eq!(query_token(&request), None);
        assert_eq!(bearer_token(&request), None);
    }
}
