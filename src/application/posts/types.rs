use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::RepoError;
use crate::domain::entities::{CategoryRecord, CommentRecord, PostRecord, TagRecord};
use crate::domain::error::DomainError;
use crate::domain::lifecycle::{InvalidTransition, Transition};
use crate::domain::types::PostStatus;

pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post not found")]
    NotFound,
    #[error("{entity} `{id}` does not exist")]
    UnknownReference { entity: &'static str, id: Uuid },
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    /// Defaults to draft.
    pub status: Option<PostStatus>,
    pub category_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    /// `None` keeps the current tags.
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Result of a lifecycle transition. Rejection is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied(PostRecord),
    Rejected {
        post: PostRecord,
        reason: InvalidTransition,
    },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkTransitionReport {
    pub transition: Transition,
    pub applied: Vec<Uuid>,
    pub rejected: Vec<Uuid>,
    pub missing: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub post: PostRecord,
    pub category: Option<CategoryRecord>,
    pub tags: Vec<TagRecord>,
    pub comments: Vec<CommentRecord>,
    /// This is the most recently created published post.
    pub is_latest: bool,
}
