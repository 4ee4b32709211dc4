//! Likes and comments on a resource.
//!
//! GET /api/resources/:key/engagement
//! POST /api/resources/:key/like
//! POST /api/resources/:key/comments
//! PUT /api/resources/:key/comments/:id
//! DELETE /api/resources/:key/comments/:id

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::common::{CommentId, MemberId, ResourceKey};
use crate::domains::auth::SessionUser;
use crate::domains::engagement::{Comment, EngagementBinding, LikeRecord, LikeToggle};
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::notice::Notice;

#[derive(Deserialize)]
pub struct CommentBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub author_name: String,
    pub text: String,
    pub display_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whether the viewer may edit or delete it.
    pub can_modify: bool,
}

impl CommentView {
    fn new(comment: &Comment, binding: &EngagementBinding) -> Self {
        Self::with_permission(comment, binding.can_modify(comment))
    }

    /// The comment as `viewer` sees it. The author's member id is never exposed.
    pub fn for_viewer(comment: &Comment, viewer: MemberId) -> Self {
        Self::with_permission(comment, comment.is_authored_by(viewer))
    }

    fn with_permission(comment: &Comment, can_modify: bool) -> Self {
        Self {
            id: comment.id,
            author_name: comment.author_name.clone(),
            text: comment.text.clone(),
            display_time: comment.display_time(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            can_modify,
        }
    }
}

/// Like count and the viewer's own membership; who else liked stays private.
#[derive(Debug, Serialize)]
pub struct LikesView {
    pub count: u32,
    pub liked_by_me: bool,
}

impl LikesView {
    pub fn for_viewer(likes: &LikeRecord, viewer: MemberId) -> Self {
        Self {
            count: likes.count(),
            liked_by_me: likes.liked_by(viewer),
        }
    }
}

#[derive(Serialize)]
pub struct EngagementResponse {
    pub resource_key: ResourceKey,
    pub likes: LikesView,
    pub comments: Vec<CommentView>,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub likes: LikesView,
    pub notice: Notice,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub comment: CommentView,
    pub notice: Notice,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub notice: Notice,
}

async fn bind(
    deps: &ServerDeps,
    key: &str,
    user: SessionUser,
) -> Result<EngagementBinding, ApiError> {
    let key = ResourceKey::parse(key)?;
    EngagementBinding::attach(
        key,
        Some(user),
        deps.engagement.clone(),
        deps.stream_hub.clone(),
    )
    .await
    .map_err(Into::into)
}

fn likes_view(binding: &EngagementBinding) -> LikesView {
    LikesView {
        count: binding.likes().count(),
        liked_by_me: binding.liked_by_viewer(),
    }
}

fn comment_id(raw: &str) -> Result<CommentId, ApiError> {
    CommentId::parse(raw).map_err(|_| ApiError::NotFound("Comment not found".to_string()))
}

pub async fn engagement_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
    Path(key): Path<String>,
) -> Result<Json<EngagementResponse>, ApiError> {
    let binding = bind(&deps, &key, user).await?;

    Ok(Json(EngagementResponse {
        resource_key: binding.resource().clone(),
        likes: likes_view(&binding),
        comments: binding
            .comments()
            .iter()
            .map(|c| CommentView::new(c, &binding))
            .collect(),
    }))
}

pub async fn toggle_like_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
    Path(key): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let mut binding = bind(&deps, &key, user).await?;
    let notice = match binding.toggle_like().await? {
        LikeToggle::Liked => Notice::success("Liked!"),
        LikeToggle::Unliked => Notice::info("Like removed"),
    };

    Ok(Json(LikeResponse {
        likes: likes_view(&binding),
        notice,
    }))
}

pub async fn add_comment_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
    Path(key): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let mut binding = bind(&deps, &key, user).await?;
    let comment = binding.add_comment(&body.text).await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            comment: CommentView::new(&comment, &binding),
            notice: Notice::success("Comment Added Successfully!"),
        }),
    ))
}

pub async fn edit_comment_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
    Path((key, id)): Path<(String, String)>,
    Json(body): Json<CommentBody>,
) -> Result<Json<CommentResponse>, ApiError> {
    let id = comment_id(&id)?;
    let mut binding = bind(&deps, &key, user).await?;
    let comment = binding.edit_comment(id, &body.text).await?;

    Ok(Json(CommentResponse {
        comment: CommentView::new(&comment, &binding),
        notice: Notice::success("Comment Updated Successfully!"),
    }))
}

pub async fn delete_comment_handler(
    Extension(deps): Extension<Arc<ServerDeps>>,
    Extension(user): Extension<SessionUser>,
    Path((key, id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = comment_id(&id)?;
    let mut binding = bind(&deps, &key, user).await?;
    binding.delete_comment(id).await?;

    Ok(Json(DeletedResponse {
        notice: Notice::success("Comment Deleted Successfully!"),
    }))
}
