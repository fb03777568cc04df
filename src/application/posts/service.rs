use std::sync::Arc;

use crate::application::audit::AuditRecorder;
use crate::application::repos::{
    CategoriesRepo, CommentsRepo, PostsRepo, PostsWriteRepo, TagsRepo,
};

/// Post lifecycle and content operations.
///
/// Every mutation that changes a post row reports to the [`AuditRecorder`]
/// explicitly; view counting is the one write that does not.
#[derive(Clone)]
pub struct PostService {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) categories: Arc<dyn CategoriesRepo>,
    pub(crate) tags: Arc<dyn TagsRepo>,
    pub(crate) comments: Arc<dyn CommentsRepo>,
    pub(crate) audit: AuditRecorder,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        categories: Arc<dyn CategoriesRepo>,
        tags: Arc<dyn TagsRepo>,
        comments: Arc<dyn CommentsRepo>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            reader,
            writer,
            categories,
            tags,
            comments,
            audit,
        }
    }
}
