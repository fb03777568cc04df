use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::repos::{PostQueryFilter, PostsRepo, RepoError};
use crate::domain::entities::{PostRecord, RankedPost};
use crate::domain::search::{CONTENT_RANK, TITLE_RANK, contains_pattern};
use crate::domain::types::PostStatus;

use super::super::util::convert_count;
use super::super::{POST_COLUMNS, POST_FROM, PostgresRepositories};
use super::types::{PostRow, RankedPostRow};
use crate::infra::db::map_sqlx_error;

impl PostgresRepositories {
    fn push_search_condition<'q>(qb: &mut QueryBuilder<'q, Postgres>, pattern: &'q str) {
        qb.push(" AND p.status = ");
        qb.push_bind(PostStatus::Published);
        qb.push(" AND (p.title ILIKE ");
        qb.push_bind(pattern);
        qb.push(" OR p.content ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::new("");
        Self::push_post_select(&mut qb);
        Self::apply_post_filter(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        qb.push_bind(i64::from(limit));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE 1=1 ");
        Self::apply_post_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        convert_count(count)
    }

    async fn search_published(
        &self,
        query: &str,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RankedPost>, RepoError> {
        let pattern = contains_pattern(query);

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(", CASE WHEN p.title ILIKE ");
        qb.push_bind(&pattern);
        qb.push(" THEN ");
        qb.push_bind(TITLE_RANK);
        qb.push(" ELSE ");
        qb.push_bind(CONTENT_RANK);
        qb.push(" END AS rank");
        qb.push(POST_FROM);
        qb.push(" WHERE 1=1 ");
        Self::push_search_condition(&mut qb, &pattern);
        qb.push(" ORDER BY rank DESC, p.created_at DESC, p.id DESC LIMIT ");
        qb.push_bind(i64::from(limit));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<RankedPostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(RankedPost::from).collect())
    }

    async fn count_search(&self, query: &str) -> Result<u64, RepoError> {
        let pattern = contains_pattern(query);

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE 1=1 ");
        Self::push_search_condition(&mut qb, &pattern);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        convert_count(count)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS}{POST_FROM}WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn latest_published_id(&self) -> Result<Option<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM posts WHERE status = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(PostStatus::Published)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_post_ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM posts WHERE author_id = $1 ORDER BY created_at, id",
        )
        .bind(author_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
