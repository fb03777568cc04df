use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CommentsRepo, CreateCommentParams, RepoError};
use crate::domain::entities::CommentRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    author_name: String,
    content: String,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_name: row.author_name,
            content: row.content,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let row = sqlx::query_as::<_, CommentRow>(
            "WITH c AS ( \
                 INSERT INTO comments (id, post_id, author_id, content) \
                 VALUES ($1, $2, $3, $4) RETURNING * \
             ) \
             SELECT c.id, c.post_id, c.author_id, u.username AS author_name, c.content, \
                    c.is_active, c.created_at, c.updated_at \
             FROM c INNER JOIN users u ON u.id = c.author_id",
        )
        .bind(Uuid::new_v4())
        .bind(params.post_id)
        .bind(params.author_id)
        .bind(params.content)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CommentRecord::from(row))
    }

    async fn list_for_post(
        &self,
        post_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.post_id, c.author_id, u.username AS author_name, c.content, \
                    c.is_active, c.created_at, c.updated_at \
             FROM comments c INNER JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = $1 AND ($2 = FALSE OR c.is_active) \
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(post_id)
        .bind(active_only)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }

    async fn set_active(&self, ids: &[Uuid], active: bool) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE comments SET is_active = $2, updated_at = now() \
             WHERE id = ANY($1) AND is_active <> $2",
        )
        .bind(ids)
        .bind(active)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
