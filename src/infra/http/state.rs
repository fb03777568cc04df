use std::sync::Arc;

use crate::application::audit::AuditRecorder;
use crate::application::comments::CommentService;
use crate::application::context::ApplicationContext;
use crate::application::feed::FeedService;
use crate::application::posts::PostService;
use crate::application::repos::HealthRepo;
use crate::application::syndication::SyndicationService;
use crate::application::taxonomy::TaxonomyService;
use crate::application::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub feed: Arc<FeedService>,
    pub comments: Arc<CommentService>,
    pub taxonomy: Arc<TaxonomyService>,
    pub users: Arc<UserService>,
    pub audit: Arc<AuditRecorder>,
    pub syndication: Arc<SyndicationService>,
    pub health: Arc<dyn HealthRepo>,
}

impl From<ApplicationContext> for AppState {
    fn from(ctx: ApplicationContext) -> Self {
        Self {
            posts: Arc::new(ctx.posts),
            feed: Arc::new(ctx.feed),
            comments: Arc::new(ctx.comments),
            taxonomy: Arc::new(ctx.taxonomy),
            users: Arc::new(ctx.users),
            audit: Arc::new(ctx.audit),
            syndication: Arc::new(ctx.syndication),
            health: ctx.health,
        }
    }
}
