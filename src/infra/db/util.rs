use crate::application::repos::RepoError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";
const RESTRICT_VIOLATION: &str = "23001";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const QUERY_CANCELED: &str = "57014";

/// Translate a driver error into the repository taxonomy by SQLSTATE.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => RepoError::Duplicate {
                    constraint: db.constraint().unwrap_or("unknown").to_string(),
                },
                Some(FOREIGN_KEY_VIOLATION)
                | Some(INVALID_TEXT_REPRESENTATION)
                | Some(STRING_DATA_RIGHT_TRUNCATION) => RepoError::InvalidInput { message },
                Some(NOT_NULL_VIOLATION) | Some(CHECK_VIOLATION) | Some(RESTRICT_VIOLATION) => {
                    RepoError::Integrity { message }
                }
                Some(QUERY_CANCELED) => RepoError::Timeout,
                _ => RepoError::Persistence(message),
            }
        }
        other => RepoError::from_persistence(other),
    }
}

/// Convert a Postgres `BIGINT` count to `u64`.
pub(crate) fn convert_count(value: i64) -> Result<u64, RepoError> {
    value
        .try_into()
        .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
}
