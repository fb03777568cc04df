use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lifecycle::Transition;
use crate::domain::types::{ActivityAction, PostStatus};

/// `?page=` is kept as raw text; unparsable values fall back to the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminPostListQuery {
    pub status: Option<PostStatus>,
    pub category: Option<Uuid>,
    pub tag: Option<Uuid>,
    pub author: Option<Uuid>,
    pub title: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityListQuery {
    pub action: Option<ActivityAction>,
    pub user: Option<Uuid>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostCreateRequest {
    pub title: String,
    pub content: String,
    pub status: Option<PostStatus>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostUpdateRequest {
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostTagsRequest {
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<Uuid>,
    pub action: Transition,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentCreateRequest {
    pub content: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentModerationRequest {
    pub ids: Vec<Uuid>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentModerationResponse {
    pub changed: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryCreateRequest {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TagCreateRequest {
    pub name: String,
    pub slug: Option<String>,
}
