//! Sign-in and sign-out.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::common::AuthError;
use crate::domains::auth::models::Member;
use crate::domains::auth::session::SessionUser;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub user: SessionUser,
}

/// Exchange an identity-provider token for a session.
pub async fn sign_in(id_token: &str, deps: &ServerDeps) -> Result<SignedIn, AuthError> {
    let identity = deps.jwt_service.verify_identity_token(id_token).map_err(|e| {
        warn!(error = %e, "Rejected identity token");
        AuthError::InvalidToken
    })?;

    let member = Member::upsert_from_identity(
        &identity.sub,
        identity.name.as_deref(),
        identity.email.as_deref(),
        identity.picture.as_deref(),
        &deps.db_pool,
    )
    .await?;

    let user = deps
        .sessions
        .open(
            member.id,
            member.display_name.clone(),
            member.email.clone(),
            member.photo_url.clone(),
        )
        .await;

    let token = deps.jwt_service.create_token(
        member.id.into_uuid(),
        member.display_name.clone(),
        user.session_id,
    )?;

    info!(member_id = %member.id, session_id = %user.session_id, "Member signed in");
    Ok(SignedIn { token, user })
}

/// End a session. Anything subscribed to it loses access immediately.
pub async fn sign_out(session_id: Uuid, deps: &ServerDeps) -> Result<(), AuthError> {
    if deps.sessions.close(session_id).await {
        info!(session_id = %session_id, "Member signed out");
        Ok(())
    } else {
        Err(AuthError::SessionEnded)
    }
}
