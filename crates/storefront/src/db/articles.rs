//! Blog article repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gebeya_core::{ArticleId, Slug, UserId};

use super::{RepositoryError, with_unique_slug};
use crate::models::Article;

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: i32,
    title: String,
    slug: String,
    content: String,
    author_id: Option<i32>,
    author_name: Option<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: ArticleId::new(row.id),
            title: row.title,
            slug: Slug::from_trusted(row.slug),
            content: row.content,
            author_id: row.author_id.map(UserId::new),
            author_name: row.author_name,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ARTICLE_SELECT: &str = "SELECT a.id, a.title, a.slug, a.content, a.author_id, \
                              u.username AS author_name, a.is_published, \
                              a.created_at, a.updated_at \
                              FROM articles a \
                              LEFT JOIN users u ON u.id = a.author_id";

/// Repository for blog article database operations.
pub struct ArticleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ArticleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published articles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self) -> Result<Vec<Article>, RepositoryError> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "{ARTICLE_SELECT} WHERE a.is_published ORDER BY a.created_at DESC, a.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    /// An article by slug, published or not. Callers decide who may see drafts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>, RepositoryError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!("{ARTICLE_SELECT} WHERE a.slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Article::from))
    }

    /// Create an article, deriving a unique slug from the title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if no free slug could be found.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        author_id: Option<UserId>,
        is_published: bool,
    ) -> Result<ArticleId, RepositoryError> {
        let pool = self.pool;
        let id: i32 = with_unique_slug(&Slug::from_name(title), |slug| async move {
            sqlx::query_scalar(
                r"
                INSERT INTO articles (title, slug, content, author_id, is_published)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                ",
            )
            .bind(title)
            .bind(slug.as_str())
            .bind(content)
            .bind(author_id)
            .bind(is_published)
            .fetch_one(pool)
            .await
        })
        .await?;

        Ok(ArticleId::new(id))
    }
}
