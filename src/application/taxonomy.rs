use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, CreateTagParams, RepoError,
    TagsRepo, TagsWriteRepo,
};
use crate::domain::entities::{CategoryRecord, TagRecord};
use crate::domain::error::{DomainError, require_text};
use crate::domain::slug::{SlugAsyncError, SlugError, derive_slug, generate_unique_slug};

pub const MAX_CATEGORY_CHARS: usize = 100;
pub const MAX_TAG_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("slug `{slug}` is already taken")]
    SlugTaken { slug: String },
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreateTagCommand {
    pub name: String,
    pub slug: Option<String>,
}

/// Categories and tags. Slugs default to a transliteration of the name.
#[derive(Clone)]
pub struct TaxonomyService {
    categories: Arc<dyn CategoriesRepo>,
    categories_writer: Arc<dyn CategoriesWriteRepo>,
    tags: Arc<dyn TagsRepo>,
    tags_writer: Arc<dyn TagsWriteRepo>,
}

impl TaxonomyService {
    pub fn new(
        categories: Arc<dyn CategoriesRepo>,
        categories_writer: Arc<dyn CategoriesWriteRepo>,
        tags: Arc<dyn TagsRepo>,
        tags_writer: Arc<dyn TagsWriteRepo>,
    ) -> Self {
        Self {
            categories,
            categories_writer,
            tags,
            tags_writer,
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRecord>, TaxonomyError> {
        Ok(self.categories.list_categories().await?)
    }

    pub async fn list_tags(&self) -> Result<Vec<TagRecord>, TaxonomyError> {
        Ok(self.tags.list_tags().await?)
    }

    pub async fn create_category(
        &self,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, TaxonomyError> {
        let name = require_text("name", &command.name, MAX_CATEGORY_CHARS)?;

        let categories = self.categories.clone();
        let slug = resolve_slug(
            &name,
            command.slug.as_deref(),
            MAX_CATEGORY_CHARS,
            move |candidate| {
                let categories = categories.clone();
                async move {
                    categories
                        .find_category_by_slug(&candidate)
                        .await
                        .map(|existing| existing.is_none())
                }
            },
        )
        .await?;

        let category = self
            .categories_writer
            .create_category(CreateCategoryParams {
                name,
                slug,
                description: command.description.trim().to_string(),
            })
            .await?;

        info!(
            target = "pressroom::taxonomy",
            category_id = %category.id,
            slug = %category.slug,
            "category created"
        );
        Ok(category)
    }

    pub async fn create_tag(&self, command: CreateTagCommand) -> Result<TagRecord, TaxonomyError> {
        let name = require_text("name", &command.name, MAX_TAG_CHARS)?;

        let tags = self.tags.clone();
        let slug = resolve_slug(
            &name,
            command.slug.as_deref(),
            MAX_TAG_CHARS,
            move |candidate| {
                let tags = tags.clone();
                async move {
                    tags.find_tag_by_slug(&candidate)
                        .await
                        .map(|existing| existing.is_none())
                }
            },
        )
        .await?;

        let tag = self
            .tags_writer
            .create_tag(CreateTagParams { name, slug })
            .await?;

        info!(
            target = "pressroom::taxonomy",
            tag_id = %tag.id,
            slug = %tag.slug,
            "tag created"
        );
        Ok(tag)
    }

    /// Posts in the category keep existing without one.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), TaxonomyError> {
        if self.categories.find_category(id).await?.is_none() {
            return Err(TaxonomyError::NotFound { entity: "category" });
        }
        self.categories_writer.delete_category(id).await?;
        Ok(())
    }

    pub async fn delete_tag(&self, id: Uuid) -> Result<(), TaxonomyError> {
        if self.tags.find_tag(id).await?.is_none() {
            return Err(TaxonomyError::NotFound { entity: "tag" });
        }
        self.tags_writer.delete_tag(id).await?;
        Ok(())
    }
}

/// Use the supplied slug (normalised, must be free) or derive a unique one from `name`.
async fn resolve_slug<F, Fut>(
    name: &str,
    supplied: Option<&str>,
    max_len: usize,
    mut is_free: F,
) -> Result<String, TaxonomyError>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = Result<bool, RepoError>>,
{
    if let Some(raw) = supplied.filter(|value| !value.trim().is_empty()) {
        let slug = derive_slug(raw, max_len).map_err(|err| slug_validation(&err))?;
        if !is_free(slug.clone()).await? {
            return Err(TaxonomyError::SlugTaken { slug });
        }
        return Ok(slug);
    }

    match generate_unique_slug(name, max_len, is_free).await {
        Ok(slug) => Ok(slug),
        Err(SlugAsyncError::Slug(err)) => Err(slug_validation(&err).into()),
        Err(SlugAsyncError::Predicate(err)) => Err(err.into()),
    }
}

fn slug_validation(err: &SlugError) -> DomainError {
    DomainError::validation("slug", err.to_string())
}
