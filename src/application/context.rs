//! Wiring of repositories into the service graph.

use std::sync::Arc;

use crate::application::audit::AuditRecorder;
use crate::application::comments::CommentService;
use crate::application::feed::FeedService;
use crate::application::posts::PostService;
use crate::application::repos::{
    ActivityRepo, CategoriesRepo, CategoriesWriteRepo, CommentsRepo, HealthRepo, PostsRepo,
    PostsWriteRepo, TagsRepo, TagsWriteRepo, UsersRepo,
};
use crate::application::seed::SeedService;
use crate::application::syndication::{FeedChannel, SyndicationService};
use crate::application::taxonomy::TaxonomyService;
use crate::application::users::UserService;

/// Every repository port the services depend on.
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostsRepo>,
    pub posts_write: Arc<dyn PostsWriteRepo>,
    pub categories: Arc<dyn CategoriesRepo>,
    pub categories_write: Arc<dyn CategoriesWriteRepo>,
    pub tags: Arc<dyn TagsRepo>,
    pub tags_write: Arc<dyn TagsWriteRepo>,
    pub comments: Arc<dyn CommentsRepo>,
    pub activity: Arc<dyn ActivityRepo>,
    pub users: Arc<dyn UsersRepo>,
    pub health: Arc<dyn HealthRepo>,
}

impl Repositories {
    /// Use one store for every port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: PostsRepo
            + PostsWriteRepo
            + CategoriesRepo
            + CategoriesWriteRepo
            + TagsRepo
            + TagsWriteRepo
            + CommentsRepo
            + ActivityRepo
            + UsersRepo
            + HealthRepo
            + 'static,
    {
        Self {
            posts: store.clone(),
            posts_write: store.clone(),
            categories: store.clone(),
            categories_write: store.clone(),
            tags: store.clone(),
            tags_write: store.clone(),
            comments: store.clone(),
            activity: store.clone(),
            users: store.clone(),
            health: store,
        }
    }
}

#[derive(Clone)]
pub struct ApplicationContext {
    pub posts: PostService,
    pub feed: FeedService,
    pub comments: CommentService,
    pub taxonomy: TaxonomyService,
    pub users: UserService,
    pub audit: AuditRecorder,
    pub syndication: SyndicationService,
    pub seed: SeedService,
    pub health: Arc<dyn HealthRepo>,
}

impl ApplicationContext {
    pub fn new(repos: Repositories, channel: FeedChannel) -> Self {
        let audit = AuditRecorder::new(repos.activity.clone());

        let posts = PostService::new(
            repos.posts.clone(),
            repos.posts_write.clone(),
            repos.categories.clone(),
            repos.tags.clone(),
            repos.comments.clone(),
            audit.clone(),
        );
        let feed = FeedService::new(
            repos.posts.clone(),
            repos.categories.clone(),
            repos.tags.clone(),
        );
        let comments = CommentService::new(repos.posts.clone(), repos.comments.clone());
        let taxonomy = TaxonomyService::new(
            repos.categories.clone(),
            repos.categories_write.clone(),
            repos.tags.clone(),
            repos.tags_write.clone(),
        );
        let users = UserService::new(
            repos.users.clone(),
            repos.posts.clone(),
            posts.clone(),
            audit.clone(),
        );
        let syndication = SyndicationService::new(repos.posts.clone(), channel);
        let seed = SeedService::new(
            taxonomy.clone(),
            users.clone(),
            posts.clone(),
            repos.categories.clone(),
            repos.tags.clone(),
            repos.users.clone(),
            repos.posts.clone(),
        );

        Self {
            posts,
            feed,
            comments,
            taxonomy,
            users,
            audit,
            syndication,
            seed,
            health: repos.health,
        }
    }
}
