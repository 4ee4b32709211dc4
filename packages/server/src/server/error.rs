use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::common::{AuthError, GeoError, ResourceKeyError};
use crate::domains::auth::SIGN_IN_ROUTE;
use crate::domains::engagement::EngagementError;
use crate::domains::places::LookupError;
use crate::domains::profiles::ProfileError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Please sign in to continue")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Places provider unavailable")]
    Upstream(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(detail) => {
                error!(detail = %detail, "Upstream failure");
                StatusCode::BAD_GATEWAY
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match self {
            ApiError::Unauthenticated => json!({
                "error": self.to_string(),
                "redirect_to": SIGN_IN_ROUTE,
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken | AuthError::SessionEnded => ApiError::Unauthenticated,
            AuthError::InternalError(e) => ApiError::Internal(e),
        }
    }
}

impl From<EngagementError> for ApiError {
    fn from(e: EngagementError) -> Self {
        match e {
            EngagementError::SignInRequired(_) => ApiError::Unauthenticated,
            EngagementError::EmptyComment | EngagementError::CommentTooLong => {
                ApiError::Validation(e.to_string())
            }
            EngagementError::CommentNotFound => ApiError::NotFound(e.to_string()),
            EngagementError::NotAuthor => ApiError::Forbidden(e.to_string()),
            EngagementError::Store(e) => ApiError::Internal(e),
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::InvalidCoordinates(_) => ApiError::Validation(e.to_string()),
            LookupError::NotFound(_) => ApiError::NotFound(e.to_string()),
            LookupError::InvalidResource(detail) | LookupError::Provider(detail) => {
                ApiError::Upstream(detail)
            }
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::Database(e) => ApiError::Internal(e.into()),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<GeoError> for ApiError {
    fn from(e: GeoError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<ResourceKeyError> for ApiError {
    fn from(e: ResourceKeyError) -> Self {
        ApiError::Validation(e.to_string())
    }
}
