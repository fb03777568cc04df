use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CommentsRepo, CreateCommentParams, PostsRepo, RepoError};
use crate::application::viewer::Viewer;
use crate::domain::comments::validate_comment;
use crate::domain::entities::CommentRecord;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("sign in to comment")]
    Unauthenticated,
    #[error("post not found")]
    PostNotFound,
    /// Carries the submitted text back so the caller can redisplay it.
    #[error("{reason}")]
    Rejected { content: String, reason: DomainError },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostsRepo>, comments: Arc<dyn CommentsRepo>) -> Self {
        Self { posts, comments }
    }

    pub async fn add_comment(
        &self,
        viewer: &Viewer,
        post_id: Uuid,
        content: String,
    ) -> Result<CommentRecord, CommentError> {
        let Some(author) = viewer.account() else {
            return Err(CommentError::Unauthenticated);
        };

        let post = self
            .posts
            .find_post(post_id)
            .await?
            .ok_or(CommentError::PostNotFound)?;
        if !post.is_published() && !viewer.is_staff() {
            return Err(CommentError::PostNotFound);
        }

        let body = match validate_comment(&content) {
            Ok(body) => body,
            Err(reason) => return Err(CommentError::Rejected { content, reason }),
        };

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id,
                author_id: author.id,
                content: body,
            })
            .await?;

        info!(
            target = "pressroom::comments",
            post_id = %post_id,
            comment_id = %comment.id,
            "comment added"
        );
        Ok(comment)
    }

    pub async fn list_active(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, CommentError> {
        Ok(self.comments.list_for_post(post_id, true).await?)
    }

    /// Staff moderation: approve (`active = true`) or hide a batch of comments.
    pub async fn moderate(&self, ids: &[Uuid], active: bool) -> Result<u64, CommentError> {
        let changed = self.comments.set_active(ids, active).await?;
        info!(
            target = "pressroom::comments",
            requested = ids.len(),
            changed,
            active,
            "comments moderated"
        );
        Ok(changed)
    }
}
