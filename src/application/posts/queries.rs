use uuid::Uuid;

use crate::application::pagination::{DEFAULT_PAGE_SIZE, NumberedPage, PageWindow};
use crate::application::repos::PostQueryFilter;
use crate::application::viewer::Viewer;
use crate::domain::entities::PostRecord;

use super::service::PostService;
use super::types::{PostDetail, PostError};

impl PostService {
    /// Load a post for its detail page and count the view.
    ///
    /// Unpublished posts are only visible to staff; everyone else gets the
    /// same not-found outcome as for a missing id.
    pub async fn detail(&self, viewer: &Viewer, id: Uuid) -> Result<PostDetail, PostError> {
        let mut post = self
            .reader
            .find_post(id)
            .await?
            .ok_or(PostError::NotFound)?;

        if !post.is_published() && !viewer.is_staff() {
            return Err(PostError::NotFound);
        }

        post.view_count = self.increment_view_count(id).await?;

        let category = match post.category_id {
            Some(category_id) => self.categories.find_category(category_id).await?,
            None => None,
        };
        let tags = self.tags.list_for_post(id).await?;
        let comments = self.comments.list_for_post(id, true).await?;
        let is_latest = self.reader.latest_published_id().await? == Some(id);

        Ok(PostDetail {
            post,
            category,
            tags,
            comments,
            is_latest,
        })
    }

    /// Staff listing across every status, filtered by field.
    pub async fn list_admin(
        &self,
        filter: &PostQueryFilter,
        page: Option<&str>,
    ) -> Result<NumberedPage<PostRecord>, PostError> {
        let total = self.reader.count_posts(filter).await?;
        let window = PageWindow::resolve(page, total, DEFAULT_PAGE_SIZE);
        let items = self
            .reader
            .list_posts(filter, window.offset(), window.limit())
            .await?;
        Ok(window.into_page(items))
    }
}
