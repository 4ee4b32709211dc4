//! Postgres backend for likes and comments.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::{CommentId, MemberId, ResourceKey};
use crate::domains::engagement::models::{Comment, LikeRecord, NewComment};
use crate::kernel::BaseEngagementStore;

const COMMENT_COLUMNS: &str = "id, author_id, author_name, text, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresEngagementStore {
    pool: PgPool,
}

impl PostgresEngagementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    like_count: i32,
    user_ids: Vec<Uuid>,
}

#[async_trait]
impl BaseEngagementStore for PostgresEngagementStore {
    async fn likes(&self, resource: &ResourceKey) -> Result<LikeRecord> {
        let row = sqlx::query_as::<_, LikeRow>(
            "SELECT like_count, user_ids FROM resource_likes WHERE resource_key = $1",
        )
        .bind(resource.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(LikeRecord::default()),
            Some(row) => {
                let count = u32::try_from(row.like_count)
                    .with_context(|| format!("negative like count for {}", resource))?;
                LikeRecord::from_parts(count, row.user_ids.into_iter().map(MemberId::from_uuid))
                    .with_context(|| format!("corrupt like record for {}", resource))
            }
        }
    }

    async fn put_likes(&self, resource: &ResourceKey, record: &LikeRecord) -> Result<()> {
        let user_ids: Vec<Uuid> = record.users().map(|m| m.into_uuid()).collect();
        let count = i32::try_from(record.count()).context("like count overflow")?;

        sqlx::query(
            r#"
            INSERT INTO resource_likes (resource_key, like_count, user_ids)
            VALUES ($1, $2, $3)
            ON CONFLICT (resource_key) DO UPDATE SET
                like_count = EXCLUDED.like_count,
                user_ids = EXCLUDED.user_ids,
                updated_at = now()
            "#,
        )
        .bind(resource.as_str())
        .bind(count)
        .bind(&user_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn comments(&self, resource: &ResourceKey) -> Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM resource_comments WHERE resource_key = $1 ORDER BY id"
        ))
        .bind(resource.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn find_comment(
        &self,
        resource: &ResourceKey,
        id: CommentId,
    ) -> Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM resource_comments WHERE resource_key = $1 AND id = $2"
        ))
        .bind(resource.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn append_comment(&self, resource: &ResourceKey, comment: NewComment) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO resource_comments (id, resource_key, author_id, author_name, text)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(CommentId::new())
        .bind(resource.as_str())
        .bind(comment.author_id)
        .bind(&comment.author_name)
        .bind(&comment.text)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn overwrite_comment(
        &self,
        resource: &ResourceKey,
        id: CommentId,
        text: &str,
    ) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE resource_comments SET text = $3, updated_at = now()
            WHERE resource_key = $1 AND id = $2
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(resource.as_str())
        .bind(id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?
        .with_context(|| format!("comment {} not found on {}", id, resource))
    }

    async fn delete_comment(&self, resource: &ResourceKey, id: CommentId) -> Result<()> {
        sqlx::query("DELETE FROM resource_comments WHERE resource_key = $1 AND id = $2")
            .bind(resource.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
