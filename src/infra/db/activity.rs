use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{ActivityQueryFilter, ActivityRepo, NewActivityLog, RepoError};
use crate::domain::entities::ActivityLogRecord;
use crate::domain::search::contains_pattern;
use crate::domain::types::ActivityAction;

use super::{PostgresRepositories, map_sqlx_error};

const ACTIVITY_COLUMNS: &str = "a.id, a.action, a.description, a.user_id, \
     u.username AS username, a.target_title, a.created_at";

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    action: ActivityAction,
    description: String,
    user_id: Option<Uuid>,
    username: Option<String>,
    target_title: String,
    created_at: OffsetDateTime,
}

impl From<ActivityRow> for ActivityLogRecord {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            action: row.action,
            description: row.description,
            user_id: row.user_id,
            username: row.username,
            target_title: row.target_title,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ActivityRepo for PostgresRepositories {
    async fn append_log(&self, entry: NewActivityLog) -> Result<ActivityLogRecord, RepoError> {
        let sql = format!(
            "WITH a AS ( \
                 INSERT INTO activity_logs (id, action, description, user_id, target_title) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING * \
             ) \
             SELECT {ACTIVITY_COLUMNS} FROM a LEFT JOIN users u ON u.id = a.user_id"
        );

        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(entry.action)
            .bind(entry.description)
            .bind(entry.user_id)
            .bind(entry.target_title)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(ActivityLogRecord::from(row))
    }

    async fn list_activity(
        &self,
        filter: &ActivityQueryFilter,
        limit: u32,
    ) -> Result<Vec<ActivityLogRecord>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(ACTIVITY_COLUMNS);
        qb.push(" FROM activity_logs a LEFT JOIN users u ON u.id = a.user_id WHERE 1=1 ");

        if let Some(action) = filter.action {
            qb.push(" AND a.action = ");
            qb.push_bind(action);
        }

        if let Some(user_id) = filter.user_id {
            qb.push(" AND a.user_id = ");
            qb.push_bind(user_id);
        }

        if let Some(search) = filter.search.as_deref() {
            let pattern = contains_pattern(search);
            qb.push(" AND (a.description ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR a.target_title ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ");
        qb.push_bind(i64::from(limit));

        let rows = qb
            .build_query_as::<ActivityRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ActivityLogRecord::from).collect())
    }
}
