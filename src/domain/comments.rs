use crate::domain::error::{DomainError, require_text};

pub const MAX_COMMENT_CHARS: usize = 1000;

/// Validate comment input, returning the trimmed body to persist.
pub fn validate_comment(content: &str) -> Result<String, DomainError> {
    require_text("content", content, MAX_COMMENT_CHARS)
}
