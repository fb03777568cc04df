//! RSS 2.0 feed of the most recent published posts.

use std::sync::Arc;

use thiserror::Error;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;
use url::Url;

use crate::application::repos::{PostQueryFilter, PostsRepo, RepoError};
use crate::domain::entities::PostRecord;

pub const FEED_ITEM_LIMIT: u32 = 20;

#[derive(Debug, Error)]
pub enum SyndicationError {
    #[error("failed to list posts: {0}")]
    Posts(#[from] RepoError),
    #[error("failed to build permalink: {0}")]
    Link(#[from] url::ParseError),
}

/// Channel-level metadata taken from site settings.
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    /// Always ends with `/` so relative joins append instead of replacing.
    pub public_url: Url,
}

#[derive(Clone)]
pub struct SyndicationService {
    posts: Arc<dyn PostsRepo>,
    channel: FeedChannel,
}

impl SyndicationService {
    pub fn new(posts: Arc<dyn PostsRepo>, channel: FeedChannel) -> Self {
        Self { posts, channel }
    }

    pub async fn rss_feed(&self) -> Result<String, SyndicationError> {
        let posts = self
            .posts
            .list_posts(&PostQueryFilter::published(), 0, FEED_ITEM_LIMIT)
            .await?;
        render_rss(&self.channel, &posts)
    }
}

/// Permalink of a post's detail page.
pub fn post_link(base: &Url, post: &PostRecord) -> Result<Url, url::ParseError> {
    base.join(&format!("posts/{}", post.id))
}

/// Serialise `posts` (already newest first) as an RSS 2.0 document.
pub fn render_rss(channel: &FeedChannel, posts: &[PostRecord]) -> Result<String, SyndicationError> {
    let mut items = String::new();
    for post in posts {
        let link = post_link(&channel.public_url, post)?;
        items.push_str(&format!(
            "    <item>\n      <title>{}</title>\n      <link>{link}</link>\n      <guid isPermaLink=\"true\">{link}</guid>\n      <dc:creator>{}</dc:creator>\n      <pubDate>{}</pubDate>\n      <description>{}</description>\n    </item>\n",
            xml_escape(&post.title),
            xml_escape(&post.author_name),
            rfc2822(post.created_at),
            xml_escape(&post.content),
        ));
    }

    let last_build = posts
        .first()
        .map(|post| {
            format!(
                "    <lastBuildDate>{}</lastBuildDate>\n",
                rfc2822(post.created_at)
            )
        })
        .unwrap_or_default();

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n{last_build}{items}  </channel>\n</rss>\n",
        xml_escape(&channel.title),
        channel.public_url,
        xml_escape(&channel.description),
    ))
}

fn rfc2822(value: OffsetDateTime) -> String {
    value.format(&Rfc2822).unwrap_or_else(|_| value.to_string())
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
