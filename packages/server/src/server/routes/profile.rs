//! GET /api/profile, PUT /api/profile

use axum::{extract::Extension, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::domains::auth::{Member, SessionUser};
use crate::domains::profiles::{ProfileInput, UserProfile};
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::notice::Notice;

#[derive(Serialize)]
pub struct MemberView {
    pub display_name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub member: MemberView,
    /// Absent until first saved.
    pub profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

pub async fn get_profile_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let member = Member::find_by_id(user.member_id, &deps.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;
    let profile = UserProfile::find(user.member_id, &deps.db_pool).await?;

    Ok(Json(ProfileResponse {
        member: MemberView {
            display_name: member.display_name,
            email: member.email,
            photo_url: member.photo_url,
        },
        profile,
        notice: None,
    }))
}

pub async fn put_profile_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = UserProfile::upsert(user.member_id, input, &deps.db_pool).await?;

    Ok(Json(ProfileResponse {
        member: MemberView {
            display_name: user.display_name,
            email: user.email,
            photo_url: user.photo_url,
        },
        profile: Some(profile),
        notice: Some(Notice::success("Profile Updated Successfully!")),
    }))
}
