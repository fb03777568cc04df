use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateTokenParams, CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::{UserRecord, UserTokenRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    is_staff: bool,
    created_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            is_staff: row.is_staff,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserTokenRow {
    id: Uuid,
    user_id: Uuid,
    prefix: String,
    hashed_secret: Vec<u8>,
    created_at: OffsetDateTime,
    revoked_at: Option<OffsetDateTime>,
}

impl From<UserTokenRow> for UserTokenRecord {
    fn from(row: UserTokenRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            prefix: row.prefix,
            hashed_secret: row.hashed_secret,
            created_at: row.created_at,
            revoked_at: row.revoked_at,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, username, is_staff) VALUES ($1, $2, $3) \
             RETURNING id, username, is_staff, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(params.username)
        .bind(params.is_staff)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(UserRecord::from(row))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, is_staff, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, is_staff, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRecord::from))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn create_token(&self, params: CreateTokenParams) -> Result<UserTokenRecord, RepoError> {
        let row = sqlx::query_as::<_, UserTokenRow>(
            "INSERT INTO user_tokens (id, user_id, prefix, hashed_secret) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, prefix, hashed_secret, created_at, revoked_at",
        )
        .bind(Uuid::new_v4())
        .bind(params.user_id)
        .bind(params.prefix)
        .bind(params.hashed_secret)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(UserTokenRecord::from(row))
    }

    async fn find_token_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<UserTokenRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserTokenRow>(
            "SELECT id, user_id, prefix, hashed_secret, created_at, revoked_at \
             FROM user_tokens WHERE prefix = $1",
        )
        .bind(prefix)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserTokenRecord::from))
    }
}
