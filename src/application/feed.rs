use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::application::pagination::{DEFAULT_PAGE_SIZE, NumberedPage, PageWindow};
use crate::application::repos::{
    CategoriesRepo, PostQueryFilter, PostsRepo, RepoError, TagsRepo,
};
use crate::application::viewer::Viewer;
use crate::domain::entities::{CategoryRecord, PostRecord, RankedPost, TagRecord};
use crate::domain::search::normalize_query;
use crate::domain::types::PostStatus;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("unknown tag `{0}`")]
    UnknownTag(String),
    /// Returned to non-staff callers for staff-only listings.
    #[error("resource not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: CategoryRecord,
    pub page: NumberedPage<PostRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagListing {
    pub tag: TagRecord,
    pub page: NumberedPage<PostRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub total: u64,
    pub page: NumberedPage<RankedPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    pub categories: Vec<CategoryRecord>,
    pub tags: Vec<TagRecord>,
}

/// Public read paths: listings, browsing, drafts and search.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    tags: Arc<dyn TagsRepo>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        tags: Arc<dyn TagsRepo>,
    ) -> Self {
        Self {
            posts,
            categories,
            tags,
        }
    }

    pub async fn list_published(
        &self,
        page: Option<&str>,
    ) -> Result<NumberedPage<PostRecord>, FeedError> {
        self.page_of(&PostQueryFilter::published(), page).await
    }

    pub async fn category_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<CategoryListing, FeedError> {
        let category = self
            .categories
            .find_category_by_slug(slug)
            .await?
            .ok_or_else(|| FeedError::UnknownCategory(slug.to_string()))?;

        let filter = PostQueryFilter {
            category_id: Some(category.id),
            ..PostQueryFilter::published()
        };
        let page = self.page_of(&filter, page).await?;
        Ok(CategoryListing { category, page })
    }

    pub async fn tag_posts(&self, slug: &str, page: Option<&str>) -> Result<TagListing, FeedError> {
        let tag = self
            .tags
            .find_tag_by_slug(slug)
            .await?
            .ok_or_else(|| FeedError::UnknownTag(slug.to_string()))?;

        let filter = PostQueryFilter {
            tag_id: Some(tag.id),
            ..PostQueryFilter::published()
        };
        let page = self.page_of(&filter, page).await?;
        Ok(TagListing { tag, page })
    }

    /// Every draft, newest first. Non-staff callers see a plain not-found.
    pub async fn drafts(&self, viewer: &Viewer) -> Result<Vec<PostRecord>, FeedError> {
        if !viewer.is_staff() {
            return Err(FeedError::NotFound);
        }

        let filter = PostQueryFilter::with_status(PostStatus::Draft);
        let total = self.posts.count_posts(&filter).await?;
        let limit = u32::try_from(total).unwrap_or(u32::MAX);
        Ok(self.posts.list_posts(&filter, 0, limit).await?)
    }

    /// Keyword search over published posts. A blank query matches nothing.
    pub async fn search(
        &self,
        query: Option<&str>,
        page: Option<&str>,
    ) -> Result<SearchResults, FeedError> {
        let Some(query) = normalize_query(query) else {
            return Ok(SearchResults {
                query: String::new(),
                total: 0,
                page: NumberedPage::empty(DEFAULT_PAGE_SIZE),
            });
        };

        let total = self.posts.count_search(&query).await?;
        let window = PageWindow::resolve(page, total, DEFAULT_PAGE_SIZE);
        let items = self
            .posts
            .search_published(&query, window.offset(), window.limit())
            .await?;

        Ok(SearchResults {
            query,
            total,
            page: window.into_page(items),
        })
    }

    pub async fn sidebar(&self) -> Result<Sidebar, FeedError> {
        Ok(Sidebar {
            categories: self.categories.list_categories().await?,
            tags: self.tags.list_tags().await?,
        })
    }

    async fn page_of(
        &self,
        filter: &PostQueryFilter,
        page: Option<&str>,
    ) -> Result<NumberedPage<PostRecord>, FeedError> {
        let total = self.posts.count_posts(filter).await?;
        let window = PageWindow::resolve(page, total, DEFAULT_PAGE_SIZE);
        let items = self
            .posts
            .list_posts(filter, window.offset(), window.limit())
            .await?;
        Ok(window.into_page(items))
    }
}
