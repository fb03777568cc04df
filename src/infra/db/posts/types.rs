use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{PostRecord, RankedPost};
use crate::domain::types::PostStatus;

#[derive(sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: Uuid,
    pub(crate) author_name: String,
    pub(crate) status: PostStatus,
    pub(crate) category_id: Option<Uuid>,
    pub(crate) view_count: i64,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) updated_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            author_name: row.author_name,
            status: row.status,
            category_id: row.category_id,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RankedPostRow {
    #[sqlx(flatten)]
    pub(crate) post: PostRow,
    pub(crate) rank: i32,
}

impl From<RankedPostRow> for RankedPost {
    fn from(row: RankedPostRow) -> Self {
        Self {
            post: row.post.into(),
            rank: row.rank,
        }
    }
}
