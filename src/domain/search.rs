//! Keyword matching and relevance ranking for post search.

/// Rank assigned when the query occurs in the title.
pub const TITLE_RANK: i32 = 2;
/// Rank assigned when the query occurs only in the content.
pub const CONTENT_RANK: i32 = 1;

/// Trim the raw query; blank input yields `None` and short-circuits search.
pub fn normalize_query(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Relevance of a post for `query`, or `None` when neither field contains it.
///
/// Matching is a case-insensitive substring test, the same predicate the
/// database applies with `ILIKE`.
pub fn rank(query: &str, title: &str, content: &str) -> Option<i32> {
    let needle = query.to_lowercase();
    if title.to_lowercase().contains(&needle) {
        Some(TITLE_RANK)
    } else if content.to_lowercase().contains(&needle) {
        Some(CONTENT_RANK)
    } else {
        None
    }
}

/// Escape `%`, `_` and `\` so the query is matched literally inside a LIKE pattern.
pub fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `%query%` with metacharacters escaped.
pub fn contains_pattern(query: &str) -> String {
    format!("%{}%", escape_like(query))
}
