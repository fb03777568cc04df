use tracing::{debug, info};
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, RepoError, UpdatePostParams};
use crate::domain::entities::PostRecord;
use crate::domain::error::{DomainError, require_text};
use crate::domain::lifecycle::{self, Transition};
use crate::domain::types::{ActivityAction, PostStatus};

use super::service::PostService;
use super::types::{
    BulkTransitionReport, CreatePostCommand, MAX_TITLE_CHARS, PostError, TransitionOutcome,
    UpdatePostCommand,
};

impl PostService {
    pub async fn create_post(&self, command: CreatePostCommand) -> Result<PostRecord, PostError> {
        let title = require_text("title", &command.title, MAX_TITLE_CHARS)?;
        ensure_content(&command.content)?;
        self.ensure_category(command.category_id).await?;
        self.ensure_tags(&command.tag_ids).await?;

        let params = CreatePostParams {
            title,
            content: command.content,
            author_id: command.author_id,
            status: command.status.unwrap_or(PostStatus::Draft),
            category_id: command.category_id,
            tag_ids: command.tag_ids,
        };

        let post = self.writer.create_post(params).await?;
        self.audit.post_created(&post).await?;

        info!(
            target = "pressroom::posts",
            post_id = %post.id,
            status = post.status.as_str(),
            "post created"
        );
        Ok(post)
    }

    pub async fn update_post(&self, command: UpdatePostCommand) -> Result<PostRecord, PostError> {
        let title = require_text("title", &command.title, MAX_TITLE_CHARS)?;
        ensure_content(&command.content)?;

        if self.reader.find_post(command.id).await?.is_none() {
            return Err(PostError::NotFound);
        }
        self.ensure_category(command.category_id).await?;
        if let Some(tag_ids) = command.tag_ids.as_ref() {
            self.ensure_tags(tag_ids).await?;
        }

        let post = self
            .writer
            .update_post(UpdatePostParams {
                id: command.id,
                title,
                content: command.content,
                category_id: command.category_id,
                tag_ids: command.tag_ids,
            })
            .await?;

        self.audit.post_updated(&post).await?;
        Ok(post)
    }

    /// Replace the tag set of a post. Tag links are not part of the post row,
    /// so this does not produce an activity entry.
    pub async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), PostError> {
        if self.reader.find_post(post_id).await?.is_none() {
            return Err(PostError::NotFound);
        }
        self.ensure_tags(tag_ids).await?;
        self.writer.replace_post_tags(post_id, tag_ids).await?;
        Ok(())
    }

    /// Remove the post together with its activity entry. Its comments go with it.
    pub async fn delete_post(&self, id: Uuid) -> Result<PostRecord, PostError> {
        let post = self
            .reader
            .find_post(id)
            .await?
            .ok_or(PostError::NotFound)?;

        let entry = self.audit.post_deletion(&post);
        match self.writer.delete_post(id, entry).await {
            Ok(()) => self.audit.appended(ActivityAction::DeletePost),
            Err(RepoError::NotFound) => return Err(PostError::NotFound),
            Err(err) => {
                self.audit.append_failed(ActivityAction::DeletePost, &post.title, &err);
                return Err(err.into());
            }
        }

        info!(target = "pressroom::posts", post_id = %id, "post deleted");
        Ok(post)
    }

    pub async fn publish(&self, id: Uuid) -> Result<TransitionOutcome, PostError> {
        self.transition(id, Transition::Publish).await
    }

    pub async fn archive(&self, id: Uuid) -> Result<TransitionOutcome, PostError> {
        self.transition(id, Transition::Archive).await
    }

    pub async fn revert_to_draft(&self, id: Uuid) -> Result<TransitionOutcome, PostError> {
        self.transition(id, Transition::RevertToDraft).await
    }

    pub async fn transition(
        &self,
        id: Uuid,
        transition: Transition,
    ) -> Result<TransitionOutcome, PostError> {
        let post = self
            .reader
            .find_post(id)
            .await?
            .ok_or(PostError::NotFound)?;

        if let Err(reason) = lifecycle::apply(post.status, transition) {
            return Ok(rejected(post, reason));
        }

        let updated = self
            .writer
            .transition_status(id, transition.source(), transition.target())
            .await?;

        match updated {
            Some(post) => {
                self.audit.post_updated(&post).await?;
                metrics::counter!(
                    "pressroom_post_transition_total",
                    "transition" => transition.as_str(),
                    "outcome" => "applied"
                )
                .increment(1);
                info!(
                    target = "pressroom::posts",
                    post_id = %id,
                    transition = transition.as_str(),
                    status = post.status.as_str(),
                    "post status changed"
                );
                Ok(TransitionOutcome::Applied(post))
            }
            // Lost a race: the row changed between the read and the conditional write.
            None => {
                let current = self
                    .reader
                    .find_post(id)
                    .await?
                    .ok_or(PostError::NotFound)?;
                let reason = match lifecycle::apply(current.status, transition) {
                    Err(reason) => reason,
                    Ok(_) => lifecycle::InvalidTransition {
                        transition,
                        current: current.status,
                    },
                };
                Ok(rejected(current, reason))
            }
        }
    }

    /// Apply `transition` to each id through the single-post path.
    pub async fn bulk_transition(
        &self,
        ids: &[Uuid],
        transition: Transition,
    ) -> Result<BulkTransitionReport, PostError> {
        let mut report = BulkTransitionReport {
            transition,
            applied: Vec::new(),
            rejected: Vec::new(),
            missing: Vec::new(),
        };

        for &id in ids {
            match self.transition(id, transition).await {
                Ok(TransitionOutcome::Applied(_)) => report.applied.push(id),
                Ok(TransitionOutcome::Rejected { .. }) => report.rejected.push(id),
                Err(PostError::NotFound) => report.missing.push(id),
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    /// Count one view. Deliberately unaudited and leaves `updated_at` alone.
    pub async fn increment_view_count(&self, id: Uuid) -> Result<i64, PostError> {
        let count = self.writer.increment_view_count(id).await?;
        metrics::counter!("pressroom_post_view_total").increment(1);
        Ok(count)
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> Result<(), PostError> {
        if let Some(id) = category_id
            && self.categories.find_category(id).await?.is_none()
        {
            return Err(PostError::UnknownReference {
                entity: "category",
                id,
            });
        }
        Ok(())
    }

    async fn ensure_tags(&self, tag_ids: &[Uuid]) -> Result<(), PostError> {
        for &id in tag_ids {
            if self.tags.find_tag(id).await?.is_none() {
                return Err(PostError::UnknownReference { entity: "tag", id });
            }
        }
        Ok(())
    }
}

fn ensure_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::validation("content", "must not be empty"));
    }
    Ok(())
}

fn rejected(post: PostRecord, reason: lifecycle::InvalidTransition) -> TransitionOutcome {
    metrics::counter!(
        "pressroom_post_transition_total",
        "transition" => reason.transition.as_str(),
        "outcome" => "rejected"
    )
    .increment(1);
    debug!(
        target = "pressroom::posts",
        post_id = %post.id,
        transition = reason.transition.as_str(),
        current = post.status.as_str(),
        "post status change rejected"
    );
    TransitionOutcome::Rejected { post, reason }
}
