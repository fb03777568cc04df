use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, NewActivityLog, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;
use crate::domain::types::PostStatus;

use super::super::{POST_COLUMNS, PostgresRepositories};
use super::types::PostRow;
use crate::infra::db::map_sqlx_error;

/// Wrap a data-modifying statement that `RETURNING *` from `posts` so the
/// result carries the joined author name like every other post read.
fn returning_post(statement: &str) -> String {
    format!(
        "WITH p AS ({statement} RETURNING *) \
         SELECT {} FROM p INNER JOIN users u ON u.id = p.author_id",
        POST_COLUMNS
    )
}

/// Replace the tag links of `post_id` on an open connection. Unknown tag ids
/// fail on `post_tags_tag_id_fkey`.
async fn link_tags(
    conn: &mut PgConnection,
    post_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), RepoError> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    if !tag_ids.is_empty() {
        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) \
             SELECT $1, id FROM UNNEST($2::uuid[]) AS id \
             ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }

    Ok(())
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let CreatePostParams {
            title,
            content,
            author_id,
            status,
            category_id,
            tag_ids,
        } = params;

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        let sql = returning_post(
            "INSERT INTO posts (id, title, content, author_id, status, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(title)
            .bind(content)
            .bind(author_id)
            .bind(status)
            .bind(category_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if !tag_ids.is_empty() {
            link_tags(&mut tx, row.id, &tag_ids).await?;
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let sql = returning_post(
            "UPDATE posts SET title = $2, content = $3, category_id = $4, updated_at = now() \
             WHERE id = $1",
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(params.id)
            .bind(params.title)
            .bind(params.content)
            .bind(params.category_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        if let Some(tag_ids) = params.tag_ids.as_deref() {
            link_tags(&mut tx, params.id, tag_ids).await?;
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<Option<PostRecord>, RepoError> {
        let sql = returning_post(
            "UPDATE posts SET status = $3, updated_at = now() WHERE id = $1 AND status = $2",
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)
    }

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        link_tags(&mut tx, post_id, tag_ids).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete_post(&self, id: Uuid, log: NewActivityLog) -> Result<(), RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        // A concurrent delete holds the lock until it commits, after which
        // the row is gone and this one backs out without logging.
        let locked =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        if locked.is_none() {
            return Err(RepoError::NotFound);
        }

        sqlx::query(
            "INSERT INTO activity_logs (id, action, description, user_id, target_title) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(log.action)
        .bind(log.description)
        .bind(log.user_id)
        .bind(log.target_title)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}
