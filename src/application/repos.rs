//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    ActivityLogRecord, CategoryRecord, CommentRecord, PostRecord, RankedPost, TagRecord,
    UserRecord, UserTokenRecord,
};
use crate::domain::types::{ActivityAction, PostStatus};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Field filters combined with AND. `None` leaves the field unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQueryFilter {
    pub status: Option<PostStatus>,
    pub category_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub title: Option<String>,
}

impl PostQueryFilter {
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Self::default()
        }
    }

    pub fn with_status(status: PostStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
    /// Linked in the same transaction as the insert.
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    /// `None` keeps the current links; otherwise they are replaced with the update.
    pub tag_ids: Option<Vec<Uuid>>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Posts matching `filter`, newest first (`created_at DESC, id DESC`).
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError>;

    /// Published posts whose title or content contains `query` case-insensitively,
    /// ordered by rank and then newest first.
    async fn search_published(
        &self,
        query: &str,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RankedPost>, RepoError>;

    async fn count_search(&self, query: &str) -> Result<u64, RepoError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    /// The most recently created published post.
    async fn latest_published_id(&self) -> Result<Option<Uuid>, RepoError>;

    async fn list_post_ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    /// Insert the post and link its tags atomically.
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    /// Update the row and, when given, replace its tag links atomically.
    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Move a post from `from` to `to` in a single conditional write.
    ///
    /// Returns `None` when the post is absent or no longer in `from`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<Option<PostRecord>, RepoError>;

    /// Atomically add one to the view counter without touching `updated_at`.
    async fn increment_view_count(&self, id: Uuid) -> Result<i64, RepoError>;

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;

    /// Append `log` and delete the post in one transaction. A post that is
    /// already gone yields `NotFound` and leaves no activity row behind.
    async fn delete_post(&self, id: Uuid, log: NewActivityLog) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateCategoryParams {
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;
    async fn find_category_by_slug(&self, slug: &str)
    -> Result<Option<CategoryRecord>, RepoError>;
}

#[async_trait]
pub trait CategoriesWriteRepo: Send + Sync {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    /// Posts referencing the category keep existing with no category.
    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateTagParams {
    pub name: String,
    pub slug: String,
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    /// All tags ordered by name.
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError>;
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError>;
    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError>;
    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError>;
}

#[async_trait]
pub trait TagsWriteRepo: Send + Sync {
    async fn create_tag(&self, params: CreateTagParams) -> Result<TagRecord, RepoError>;
    async fn delete_tag(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;

    /// Comments on a post, newest first.
    async fn list_for_post(
        &self,
        post_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<CommentRecord>, RepoError>;

    /// Set `is_active` on every listed comment, returning the number of rows changed.
    async fn set_active(&self, ids: &[Uuid], active: bool) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub action: ActivityAction,
    pub description: String,
    pub user_id: Option<Uuid>,
    pub target_title: String,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityQueryFilter {
    pub action: Option<ActivityAction>,
    pub user_id: Option<Uuid>,
    /// Case-insensitive match against description or target title.
    pub search: Option<String>,
}

/// Append-only access to the activity log. There is deliberately no way to
/// update or delete a row through this trait.
#[async_trait]
pub trait ActivityRepo: Send + Sync {
    async fn append_log(&self, entry: NewActivityLog) -> Result<ActivityLogRecord, RepoError>;

    /// Matching rows, newest first, at most `limit`.
    async fn list_activity(
        &self,
        filter: &ActivityQueryFilter,
        limit: u32,
    ) -> Result<Vec<ActivityLogRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone)]
pub struct CreateTokenParams {
    pub user_id: Uuid,
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
    async fn find_user_by_username(&self, username: &str)
    -> Result<Option<UserRecord>, RepoError>;
    /// Cascades to the user's posts, comments and tokens.
    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError>;
    async fn create_token(&self, params: CreateTokenParams) -> Result<UserTokenRecord, RepoError>;
    async fn find_token_by_prefix(&self, prefix: &str)
    -> Result<Option<UserTokenRecord>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
