//! Blog article domain type.

use chrono::{DateTime, Utc};

use gebeya_core::{ArticleId, Slug, UserId};

/// A blog article. `content` is Markdown.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub slug: Slug,
    pub content: String,
    pub author_id: Option<UserId>,
    /// Author's username, if the author still exists.
    pub author_name: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
