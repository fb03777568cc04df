//! In-memory repositories with the same foreign-key behaviour as the
//! Postgres schema, plus builders shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::Mutex;
use url::Url;
use uuid::Uuid;

use pressroom::application::context::{ApplicationContext, Repositories};
use pressroom::application::posts::CreatePostCommand;
use pressroom::application::repos::{
    ActivityQueryFilter, ActivityRepo, CategoriesRepo, CategoriesWriteRepo, CommentsRepo,
    CreateCategoryParams, CreateCommentParams, CreatePostParams, CreateTagParams,
    CreateTokenParams, CreateUserParams, HealthRepo, NewActivityLog, PostQueryFilter, PostsRepo,
    PostsWriteRepo, RepoError, TagsRepo, TagsWriteRepo, UpdatePostParams, UsersRepo,
};
use pressroom::application::syndication::FeedChannel;
use pressroom::domain::entities::{
    ActivityLogRecord, CategoryRecord, CommentRecord, PostRecord, RankedPost, TagRecord,
    UserRecord, UserTokenRecord,
};
use pressroom::domain::search::rank;
use pressroom::domain::types::PostStatus;

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    tokens: Vec<UserTokenRecord>,
    categories: Vec<CategoryRecord>,
    tags: Vec<TagRecord>,
    posts: Vec<PostRecord>,
    post_tags: Vec<(Uuid, Uuid)>,
    comments: Vec<CommentRecord>,
    activity: Vec<ActivityLogRecord>,
}

impl Tables {
    fn username(&self, id: Uuid) -> Option<String> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .map(|user| user.username.clone())
    }

    fn matches(&self, post: &PostRecord, filter: &PostQueryFilter) -> bool {
        filter.status.is_none_or(|status| post.status == status)
            && filter
                .category_id
                .is_none_or(|id| post.category_id == Some(id))
            && filter.tag_id.is_none_or(|tag_id| {
                self.post_tags
                    .iter()
                    .any(|&(post_id, tag)| post_id == post.id && tag == tag_id)
            })
            && filter.author_id.is_none_or(|id| post.author_id == id)
            && filter
                .title
                .as_ref()
                .is_none_or(|title| &post.title == title)
    }

    fn ensure_tags(&self, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        if tag_ids
            .iter()
            .all(|id| self.tags.iter().any(|tag| tag.id == *id))
        {
            Ok(())
        } else {
            Err(RepoError::InvalidInput {
                message: "post_tags_tag_id_fkey".into(),
            })
        }
    }

    fn link_tags(&mut self, post_id: Uuid, tag_ids: &[Uuid]) {
        self.post_tags.retain(|&(post, _)| post != post_id);
        for &tag_id in tag_ids {
            if !self.post_tags.contains(&(post_id, tag_id)) {
                self.post_tags.push((post_id, tag_id));
            }
        }
    }

    fn remove_post(&mut self, id: Uuid) {
        self.posts.retain(|post| post.id != id);
        self.post_tags.retain(|&(post_id, _)| post_id != id);
        self.comments.retain(|comment| comment.post_id != id);
    }

    fn with_username(&self, mut row: ActivityLogRecord) -> ActivityLogRecord {
        row.username = row.user_id.and_then(|id| self.username(id));
        row
    }
}

/// A `Mutex`-guarded store implementing every repository port.
///
/// Timestamps come from a deterministic clock that advances one second per
/// write, so "newest first" ordering is stable across runs.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    ticks: AtomicI64,
    fail_activity: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            ticks: AtomicI64::new(0),
            fail_activity: AtomicBool::new(false),
        }
    }
}

impl MemoryStore {
    fn now(&self) -> OffsetDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        datetime!(2024-03-01 09:00 UTC) + Duration::seconds(tick)
    }

    /// Make subsequent activity appends fail, as if the audit table were unavailable.
    pub fn fail_activity_appends(&self, fail: bool) {
        self.fail_activity.store(fail, Ordering::SeqCst);
    }

    pub async fn activity_rows(&self) -> Vec<ActivityLogRecord> {
        let tables = self.tables.lock().await;
        tables
            .activity
            .iter()
            .cloned()
            .map(|row| tables.with_username(row))
            .collect()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.lock().await.comments.len()
    }

    pub async fn token_count(&self) -> usize {
        self.tables.lock().await.tokens.len()
    }

    pub async fn post(&self, id: Uuid) -> Option<PostRecord> {
        self.tables
            .lock()
            .await
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
    }
}

fn sort_newest_first(posts: &mut [PostRecord]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn activity_row(entry: NewActivityLog, created_at: OffsetDateTime) -> ActivityLogRecord {
    ActivityLogRecord {
        id: Uuid::new_v4(),
        action: entry.action,
        description: entry.description,
        user_id: entry.user_id,
        username: None,
        target_title: entry.target_title,
        created_at,
    }
}

fn page<T>(items: Vec<T>, offset: u64, limit: u32) -> Vec<T> {
    items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn list_posts(
        &self,
        filter: &PostQueryFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut posts: Vec<PostRecord> = tables
            .posts
            .iter()
            .filter(|post| tables.matches(post, filter))
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        Ok(page(posts, offset, limit))
    }

    async fn count_posts(&self, filter: &PostQueryFilter) -> Result<u64, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .filter(|post| tables.matches(post, filter))
            .count() as u64)
    }

    async fn search_published(
        &self,
        query: &str,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RankedPost>, RepoError> {
        let tables = self.tables.lock().await;
        let mut hits: Vec<RankedPost> = tables
            .posts
            .iter()
            .filter(|post| post.is_published())
            .filter_map(|post| {
                rank(query, &post.title, &post.content).map(|rank| RankedPost {
                    post: post.clone(),
                    rank,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.rank
                .cmp(&a.rank)
                .then(b.post.created_at.cmp(&a.post.created_at))
                .then(b.post.id.cmp(&a.post.id))
        });
        Ok(page(hits, offset, limit))
    }

    async fn count_search(&self, query: &str) -> Result<u64, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .filter(|post| post.is_published())
            .filter(|post| rank(query, &post.title, &post.content).is_some())
            .count() as u64)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.post(id).await)
    }

    async fn latest_published_id(&self) -> Result<Option<Uuid>, RepoError> {
        let published = self
            .list_posts(&PostQueryFilter::published(), 0, u32::MAX)
            .await?;
        Ok(published.into_iter().next().map(|post| post.id))
    }

    async fn list_post_ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .filter(|post| post.author_id == author_id)
            .map(|post| post.id)
            .collect())
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        let author_name = tables
            .username(params.author_id)
            .ok_or_else(|| RepoError::InvalidInput {
                message: "posts_author_id_fkey".into(),
            })?;
        if let Some(category_id) = params.category_id
            && !tables.categories.iter().any(|c| c.id == category_id)
        {
            return Err(RepoError::InvalidInput {
                message: "posts_category_id_fkey".into(),
            });
        }
        tables.ensure_tags(&params.tag_ids)?;

        let post = PostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            content: params.content,
            author_id: params.author_id,
            author_name,
            status: params.status,
            category_id: params.category_id,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        tables.link_tags(post.id, &params.tag_ids);
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        if let Some(tag_ids) = params.tag_ids.as_deref() {
            tables.ensure_tags(tag_ids)?;
        }
        let post = tables
            .posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.title = params.title;
        post.content = params.content;
        post.category_id = params.category_id;
        post.updated_at = now;
        let post = post.clone();
        if let Some(tag_ids) = params.tag_ids.as_deref() {
            tables.link_tags(post.id, tag_ids);
        }
        Ok(post)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<Option<PostRecord>, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter_mut()
            .find(|post| post.id == id && post.status == from)
            .map(|post| {
                post.status = to;
                post.updated_at = now;
                post.clone()
            }))
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<i64, RepoError> {
        let mut tables = self.tables.lock().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(RepoError::NotFound)?;
        post.view_count += 1;
        Ok(post.view_count)
    }

    async fn replace_post_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        tables.ensure_tags(tag_ids)?;
        tables.link_tags(post_id, tag_ids);
        Ok(())
    }

    async fn delete_post(&self, id: Uuid, log: NewActivityLog) -> Result<(), RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        if !tables.posts.iter().any(|post| post.id == id) {
            return Err(RepoError::NotFound);
        }
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        tables.activity.push(activity_row(log, now));
        tables.remove_post(id);
        Ok(())
    }
}

#[async_trait]
impl CategoriesRepo for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut categories = self.tables.lock().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().find(|c| c.slug == slug).cloned())
    }
}

#[async_trait]
impl CategoriesWriteRepo for MemoryStore {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "categories_slug_key".into(),
            });
        }
        let category = CategoryRecord {
            id: Uuid::new_v4(),
            name: params.name,
            slug: params.slug,
            description: params.description,
            created_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.iter_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TagsRepo for MemoryStore {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let mut tags = self.tables.lock().await.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<TagRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut tags: Vec<TagRecord> = tables
            .tags
            .iter()
            .filter(|tag| tables.post_tags.contains(&(post_id, tag.id)))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tag(&self, id: Uuid) -> Result<Option<TagRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.tags.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.tags.iter().find(|t| t.slug == slug).cloned())
    }
}

#[async_trait]
impl TagsWriteRepo for MemoryStore {
    async fn create_tag(&self, params: CreateTagParams) -> Result<TagRecord, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        if tables.tags.iter().any(|t| t.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "tags_slug_key".into(),
            });
        }
        let tag = TagRecord {
            id: Uuid::new_v4(),
            name: params.name,
            slug: params.slug,
            created_at: now,
        };
        tables.tags.push(tag.clone());
        Ok(tag)
    }

    async fn delete_tag(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        if tables.tags.len() == before {
            return Err(RepoError::NotFound);
        }
        tables.post_tags.retain(|&(_, tag)| tag != id);
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for MemoryStore {
    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        if !tables.posts.iter().any(|post| post.id == params.post_id) {
            return Err(RepoError::InvalidInput {
                message: "comments_post_id_fkey".into(),
            });
        }
        let author_name = tables
            .username(params.author_id)
            .ok_or_else(|| RepoError::InvalidInput {
                message: "comments_author_id_fkey".into(),
            })?;
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            post_id: params.post_id,
            author_id: params.author_id,
            author_name,
            content: params.content,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(
        &self,
        post_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut comments: Vec<CommentRecord> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && (!active_only || c.is_active))
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn set_active(&self, ids: &[Uuid], active: bool) -> Result<u64, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        let mut changed = 0;
        for comment in tables.comments.iter_mut() {
            if ids.contains(&comment.id) && comment.is_active != active {
                comment.is_active = active;
                comment.updated_at = now;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl ActivityRepo for MemoryStore {
    async fn append_log(&self, entry: NewActivityLog) -> Result<ActivityLogRecord, RepoError> {
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        let now = self.now();
        let mut tables = self.tables.lock().await;
        let row = activity_row(entry, now);
        tables.activity.push(row.clone());
        Ok(tables.with_username(row))
    }

    async fn list_activity(
        &self,
        filter: &ActivityQueryFilter,
        limit: u32,
    ) -> Result<Vec<ActivityLogRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let mut rows: Vec<ActivityLogRecord> = tables
            .activity
            .iter()
            .filter(|row| filter.action.is_none_or(|action| row.action == action))
            .filter(|row| filter.user_id.is_none_or(|id| row.user_id == Some(id)))
            .filter(|row| {
                needle.as_ref().is_none_or(|needle| {
                    row.description.to_lowercase().contains(needle)
                        || row.target_title.to_lowercase().contains(needle)
                })
            })
            .cloned()
            .map(|row| tables.with_username(row))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.username == params.username) {
            return Err(RepoError::Duplicate {
                constraint: "users_username_key".into(),
            });
        }
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: params.username,
            is_staff: params.is_staff,
            created_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(RepoError::NotFound);
        }

        let owned: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|post| post.author_id == id)
            .map(|post| post.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|c| c.author_id != id);
        tables.tokens.retain(|t| t.user_id != id);
        for row in tables.activity.iter_mut() {
            if row.user_id == Some(id) {
                row.user_id = None;
            }
        }
        Ok(())
    }

    async fn create_token(&self, params: CreateTokenParams) -> Result<UserTokenRecord, RepoError> {
        let now = self.now();
        let mut tables = self.tables.lock().await;
        if tables.tokens.iter().any(|t| t.prefix == params.prefix) {
            return Err(RepoError::Duplicate {
                constraint: "user_tokens_prefix_key".into(),
            });
        }
        let token = UserTokenRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            prefix: params.prefix,
            hashed_secret: params.hashed_secret,
            created_at: now,
            revoked_at: None,
        };
        tables.tokens.push(token.clone());
        Ok(token)
    }

    async fn find_token_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<UserTokenRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.tokens.iter().find(|t| t.prefix == prefix).cloned())
    }
}

#[async_trait]
impl HealthRepo for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

pub fn channel() -> FeedChannel {
    FeedChannel {
        title: "pressroom".into(),
        description: "Latest posts".into(),
        public_url: Url::parse("https://blog.example.com/").expect("static url"),
    }
}

/// A fully wired service graph over a fresh [`MemoryStore`].
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub app: ApplicationContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_posts_writer(|store| store as Arc<dyn PostsWriteRepo>)
    }

    /// Wire the services over a fresh store, routing post writes through
    /// whatever `writer` wraps around it.
    pub fn with_posts_writer(
        writer: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn PostsWriteRepo>,
    ) -> Self {
        let store = Arc::new(MemoryStore::default());
        let mut repos = Repositories::from_store(store.clone());
        repos.posts_write = writer(store.clone());
        let app = ApplicationContext::new(repos, channel());
        Self { store, app }
    }

    pub async fn staff(&self, username: &str) -> UserRecord {
        self.app
            .users
            .register(username, true)
            .await
            .expect("register staff")
    }

    pub async fn member(&self, username: &str) -> UserRecord {
        self.app
            .users
            .register(username, false)
            .await
            .expect("register member")
    }

    pub async fn post(
        &self,
        author: &UserRecord,
        title: &str,
        content: &str,
        status: Option<PostStatus>,
    ) -> PostRecord {
        self.app
            .posts
            .create_post(CreatePostCommand {
                title: title.to_string(),
                content: content.to_string(),
                author_id: author.id,
                status,
                category_id: None,
                tag_ids: Vec::new(),
            })
            .await
            .expect("create post")
    }

    pub async fn published(&self, author: &UserRecord, title: &str, content: &str) -> PostRecord {
        self.post(author, title, content, Some(PostStatus::Published))
            .await
    }
}
