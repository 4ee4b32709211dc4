//! Session routes.
//!
//! POST /api/auth/session     exchange an identity token for a session token
//! GET /api/auth/session      current session user
//! DELETE /api/auth/session   sign out

use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domains::auth::{sign_in, sign_out, SessionUser};
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::notice::Notice;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub id_token: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: SessionUser,
    pub notice: Notice,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: SessionUser,
}

#[derive(Serialize)]
pub struct SignOutResponse {
    pub notice: Notice,
}

pub async fn sign_in_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Json(body): Json<SignInRequest>,
) -> Result<(StatusCode, Json<SignInResponse>), ApiError> {
    let signed_in = sign_in(&body.id_token, &deps).await?;
    let notice = Notice::success(format!("Welcome, {}!", signed_in.user.display_name));

    Ok((
        StatusCode::CREATED,
        Json(SignInResponse {
            token: signed_in.token,
            user: signed_in.user,
            notice,
        }),
    ))
}

pub async fn session_handler(Extension(user): Extension<SessionUser>) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}

pub async fn sign_out_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<SignOutResponse>, ApiError> {
    sign_out(user.session_id, &deps).await?;
    Ok(Json(SignOutResponse {
        notice: Notice::info("Signed out"),
    }))
}
