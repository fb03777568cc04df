//! Postgres-backed repository implementations.

mod activity;
mod categories;
mod comments;
mod posts;
mod tags;
mod users;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{HealthRepo, PostQueryFilter, RepoError};

/// Column list shared by every post query; joins the author for `author_name`.
const POST_COLUMNS: &str = "p.id, p.title, p.content, p.author_id, u.username AS author_name, \
     p.status, p.category_id, p.view_count, p.created_at, p.updated_at";

const POST_FROM: &str = " FROM posts p INNER JOIN users u ON u.id = p.author_id ";

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    fn push_post_select(qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(POST_FROM);
        qb.push(" WHERE 1=1 ");
    }

    fn apply_post_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q PostQueryFilter) {
        if let Some(status) = filter.status {
            qb.push(" AND p.status = ");
            qb.push_bind(status);
        }

        if let Some(category_id) = filter.category_id {
            qb.push(" AND p.category_id = ");
            qb.push_bind(category_id);
        }

        if let Some(tag_id) = filter.tag_id {
            qb.push(" AND EXISTS (SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = ");
            qb.push_bind(tag_id);
            qb.push(")");
        }

        if let Some(author_id) = filter.author_id {
            qb.push(" AND p.author_id = ");
            qb.push_bind(author_id);
        }

        if let Some(title) = filter.title.as_ref() {
            qb.push(" AND p.title = ");
            qb.push_bind(title);
        }
    }
}

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}
