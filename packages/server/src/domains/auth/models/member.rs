use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::MemberId;

/// Display name used when the identity provider has none.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// A person who has signed in at least once.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub identity_subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_sign_in_at: DateTime<Utc>,
}

impl Member {
    /// Create the member on first sign-in, refresh name/email/photo afterwards.
    pub async fn upsert_from_identity(
        identity_subject: &str,
        display_name: Option<&str>,
        email: Option<&str>,
        photo_url: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        let display_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_NAME);

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO members (id, identity_subject, display_name, email, photo_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (identity_subject) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                photo_url = EXCLUDED.photo_url,
                last_sign_in_at = now()
            RETURNING *
            "#,
        )
        .bind(MemberId::new())
        .bind(identity_subject)
        .bind(display_name)
        .bind(email)
        .bind(photo_url)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }
}
