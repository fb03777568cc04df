use std::sync::Arc;

use tracing::error;

use crate::application::repos::{ActivityQueryFilter, ActivityRepo, NewActivityLog, RepoError};
use crate::domain::entities::{ActivityLogRecord, PostRecord, UserRecord};
use crate::domain::types::ActivityAction;

/// Column width of `description` and `target_title`.
pub const MAX_AUDIT_TEXT_CHARS: usize = 200;
/// Number of rows on the public activity page.
pub const RECENT_ACTIVITY_LIMIT: u32 = 50;

/// Records activity rows for post and user mutations.
///
/// Creates and updates are recorded after the primary write commits. When
/// that append fails the write stays; the failure is logged and counted,
/// then handed back to the caller. Deletions are different: the recorder
/// only builds the entry and the writer appends it in the delete's own
/// transaction.
#[derive(Clone)]
pub struct AuditRecorder {
    repo: Arc<dyn ActivityRepo>,
}

impl AuditRecorder {
    pub fn new(repo: Arc<dyn ActivityRepo>) -> Self {
        Self { repo }
    }

    pub async fn post_created(&self, post: &PostRecord) -> Result<ActivityLogRecord, RepoError> {
        self.record(
            ActivityAction::CreatePost,
            format!("Created post: {}", post.title),
            Some(post.author_id),
            &post.title,
        )
        .await
    }

    pub async fn post_updated(&self, post: &PostRecord) -> Result<ActivityLogRecord, RepoError> {
        self.record(
            ActivityAction::UpdatePost,
            format!("Updated post: {} ({})", post.title, post.status),
            Some(post.author_id),
            &post.title,
        )
        .await
    }

    /// Entry for a post about to be deleted, built while its title and
    /// author are still readable.
    pub fn post_deletion(&self, post: &PostRecord) -> NewActivityLog {
        entry(
            ActivityAction::DeletePost,
            format!("Deleted post: {}", post.title),
            Some(post.author_id),
            &post.title,
        )
    }

    pub async fn user_registered(
        &self,
        user: &UserRecord,
    ) -> Result<ActivityLogRecord, RepoError> {
        self.record(
            ActivityAction::CreateUser,
            format!("New user registered: {}", user.username),
            Some(user.id),
            &user.username,
        )
        .await
    }

    pub async fn list_recent(&self) -> Result<Vec<ActivityLogRecord>, RepoError> {
        self.repo
            .list_activity(&ActivityQueryFilter::default(), RECENT_ACTIVITY_LIMIT)
            .await
    }

    pub async fn list_filtered(
        &self,
        filter: &ActivityQueryFilter,
        limit: u32,
    ) -> Result<Vec<ActivityLogRecord>, RepoError> {
        self.repo.list_activity(filter, limit).await
    }

    /// Count an append that a writer committed on the recorder's behalf.
    pub fn appended(&self, action: ActivityAction) {
        metrics::counter!("pressroom_audit_append_total", "action" => action.as_str()).increment(1);
    }

    pub fn append_failed(&self, action: ActivityAction, target_title: &str, err: &RepoError) {
        metrics::counter!(
            "pressroom_audit_append_failed_total",
            "action" => action.as_str()
        )
        .increment(1);
        error!(
            target = "pressroom::audit",
            action = action.as_str(),
            target_title,
            error = %err,
            "failed to append activity log entry"
        );
    }

    async fn record(
        &self,
        action: ActivityAction,
        description: String,
        user_id: Option<uuid::Uuid>,
        target_title: &str,
    ) -> Result<ActivityLogRecord, RepoError> {
        match self
            .repo
            .append_log(entry(action, description, user_id, target_title))
            .await
        {
            Ok(record) => {
                self.appended(action);
                Ok(record)
            }
            Err(err) => {
                self.append_failed(action, target_title, &err);
                Err(err)
            }
        }
    }
}

fn entry(
    action: ActivityAction,
    description: String,
    user_id: Option<uuid::Uuid>,
    target_title: &str,
) -> NewActivityLog {
    NewActivityLog {
        action,
        description: truncate_chars(&description, MAX_AUDIT_TEXT_CHARS),
        user_id,
        target_title: truncate_chars(target_title, MAX_AUDIT_TEXT_CHARS),
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars(&"文".repeat(250), 200).chars().count(), 200);
    }

    #[test]
    fn deletion_entry_is_truncated_to_column_width() {
        let repo: Arc<dyn ActivityRepo> = Arc::new(NullActivity);
        let recorder = AuditRecorder::new(repo);
        let post = PostRecord {
            id: uuid::Uuid::new_v4(),
            title: "t".repeat(250),
            content: "body".into(),
            author_id: uuid::Uuid::new_v4(),
            author_name: "editor".into(),
            status: crate::domain::types::PostStatus::Published,
            category_id: None,
            view_count: 0,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
            updated_at: time::OffsetDateTime::UNIX_EPOCH,
        };

        let entry = recorder.post_deletion(&post);
        assert_eq!(entry.action, ActivityAction::DeletePost);
        assert_eq!(entry.user_id, Some(post.author_id));
        assert_eq!(entry.target_title.chars().count(), MAX_AUDIT_TEXT_CHARS);
        assert!(entry.description.starts_with("Deleted post: ttt"));
        assert_eq!(entry.description.chars().count(), MAX_AUDIT_TEXT_CHARS);
    }

    struct NullActivity;

    #[async_trait::async_trait]
    impl ActivityRepo for NullActivity {
        async fn append_log(&self, _: NewActivityLog) -> Result<ActivityLogRecord, RepoError> {
            Err(RepoError::Timeout)
        }

        async fn list_activity(
            &self,
            _: &ActivityQueryFilter,
            _: u32,
        ) -> Result<Vec<ActivityLogRecord>, RepoError> {
            Ok(Vec::new())
        }
    }
}
