//! Idempotent sample content for a fresh installation.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::posts::{CreatePostCommand, PostError, PostService};
use crate::application::repos::{
    CategoriesRepo, PostQueryFilter, PostsRepo, RepoError, TagsRepo, UsersRepo,
};
use crate::application::taxonomy::{
    CreateCategoryCommand, CreateTagCommand, TaxonomyError, TaxonomyService,
};
use crate::application::users::{UserError, UserService};
use crate::domain::entities::UserRecord;
use crate::domain::types::PostStatus;

pub const SEED_AUTHOR: &str = "admin";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
    #[error(transparent)]
    Users(#[from] UserError),
    #[error(transparent)]
    Posts(#[from] PostError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created_posts: Vec<String>,
}

struct SeedPost {
    title: &'static str,
    content: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
}

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("技术分享", "tech", "技术相关文章"),
    ("生活随笔", "life", "生活感悟和随想"),
];

const TAGS: &[(&str, &str)] = &[("Django", "django"), ("Python", "python"), ("Web开发", "web-dev")];

const POSTS: &[SeedPost] = &[
    SeedPost {
        title: "Welcome to the blog!",
        content: "This is the first post. Expect notes on programming, tooling and life.\n\n\
                  The blog supports categories, tags, search and an RSS feed.",
        category: "life",
        tags: &["web-dev"],
    },
    SeedPost {
        title: "Building a blog backend",
        content: "Model posts, categories and tags; list and detail views; keyword search; \
                  then deploy with migrations applied on startup.",
        category: "tech",
        tags: &["django", "python", "web-dev"],
    },
    SeedPost {
        title: "Small Python tricks",
        content: "List comprehensions, dict comprehensions and enumerate keep loops short:\n\n\
                  squares = [i ** 2 for i in range(10)]",
        category: "tech",
        tags: &["python"],
    },
];

#[derive(Clone)]
pub struct SeedService {
    taxonomy: TaxonomyService,
    users: UserService,
    posts: PostService,
    categories_repo: Arc<dyn CategoriesRepo>,
    tags_repo: Arc<dyn TagsRepo>,
    users_repo: Arc<dyn UsersRepo>,
    posts_repo: Arc<dyn PostsRepo>,
}

impl SeedService {
    pub fn new(
        taxonomy: TaxonomyService,
        users: UserService,
        posts: PostService,
        categories_repo: Arc<dyn CategoriesRepo>,
        tags_repo: Arc<dyn TagsRepo>,
        users_repo: Arc<dyn UsersRepo>,
        posts_repo: Arc<dyn PostsRepo>,
    ) -> Self {
        Self {
            taxonomy,
            users,
            posts,
            categories_repo,
            tags_repo,
            users_repo,
            posts_repo,
        }
    }

    /// Create whatever sample content is missing. Running it twice is a no-op.
    pub async fn run(&self) -> Result<SeedReport, SeedError> {
        for (name, slug, description) in CATEGORIES {
            if self.categories_repo.find_category_by_slug(slug).await?.is_none() {
                self.taxonomy
                    .create_category(CreateCategoryCommand {
                        name: (*name).to_string(),
                        slug: Some((*slug).to_string()),
                        description: (*description).to_string(),
                    })
                    .await?;
            }
        }

        for (name, slug) in TAGS {
            if self.tags_repo.find_tag_by_slug(slug).await?.is_none() {
                self.taxonomy
                    .create_tag(CreateTagCommand {
                        name: (*name).to_string(),
                        slug: Some((*slug).to_string()),
                    })
                    .await?;
            }
        }

        let author = self.author().await?;
        let mut report = SeedReport::default();

        for seed in POSTS {
            let existing = PostQueryFilter {
                title: Some(seed.title.to_string()),
                ..PostQueryFilter::default()
            };
            if self.posts_repo.count_posts(&existing).await? > 0 {
                continue;
            }

            let category_id = self
                .categories_repo
                .find_category_by_slug(seed.category)
                .await?
                .map(|category| category.id);
            let mut tag_ids: Vec<Uuid> = Vec::with_capacity(seed.tags.len());
            for slug in seed.tags {
                if let Some(tag) = self.tags_repo.find_tag_by_slug(slug).await? {
                    tag_ids.push(tag.id);
                }
            }

            let post = self
                .posts
                .create_post(CreatePostCommand {
                    title: seed.title.to_string(),
                    content: seed.content.to_string(),
                    author_id: author.id,
                    status: Some(PostStatus::Published),
                    category_id,
                    tag_ids,
                })
                .await?;
            info!(target = "pressroom::seed", title = %post.title, "seeded post");
            report.created_posts.push(post.title);
        }

        Ok(report)
    }

    async fn author(&self) -> Result<UserRecord, SeedError> {
        match self.users_repo.find_user_by_username(SEED_AUTHOR).await? {
            Some(user) => Ok(user),
            None => Ok(self.users.register(SEED_AUTHOR, true).await?),
        }
    }
}
