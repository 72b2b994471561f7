//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::ArticleRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::markdown;
use crate::middleware::CurrentIdentity;
use crate::models::Article;
use crate::page::PageContext;
use crate::state::AppState;

/// Characters of content shown as an excerpt on the index.
const EXCERPT_LENGTH: usize = 200;

/// Article summary for the index.
#[derive(Debug, Clone)]
pub struct ArticleSummary {
    pub article: Article,
    pub excerpt: String,
}

impl From<Article> for ArticleSummary {
    fn from(article: Article) -> Self {
        let excerpt = excerpt(&article.content, EXCERPT_LENGTH);
        Self { article, excerpt }
    }
}

/// First `max` characters of the text, cut at a word boundary.
fn excerpt(content: &str, max: usize) -> String {
    let flat: String = content
        .split_whitespace()
        .filter(|w| !w.starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    let trimmed = cut.rsplit_once(' ').map_or(cut.as_str(), |(head, _)| head);
    format!("{trimmed}…")
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub page: PageContext,
    pub articles: Vec<ArticleSummary>,
}

/// Blog article template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub page: PageContext,
    pub article: Article,
    pub content_html: String,
}

/// Display published articles, newest first.
#[instrument(skip(state, session, current))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
) -> Result<impl IntoResponse> {
    let articles = ArticleRepository::new(state.pool())
        .list_published()
        .await?
        .into_iter()
        .map(ArticleSummary::from)
        .collect();

    Ok(BlogIndexTemplate {
        page: PageContext::load(&session, &current).await?,
        articles,
    })
}

/// Display one article.
///
/// # Errors
///
/// Returns 404 if the article does not exist, or is a draft and the
/// requester is not an admin.
#[instrument(skip(state, session, current))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let article = ArticleRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|a| a.is_published || current.identity.is_admin())
        .ok_or_else(|| AppError::NotFound(format!("article {slug}")))?;

    Ok(BlogShowTemplate {
        page: PageContext::load(&session, &current).await?,
        content_html: markdown::render(&article.content),
        article,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_excerpt_is_unchanged() {
        assert_eq!(excerpt("Buna  tetu", 50), "Buna tetu");
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        let text = "Jimma coffee is grown in the forests of Kaffa and sold at the market";
        let short = excerpt(text, 20);
        assert_eq!(short, "Jimma coffee is…");
    }

    #[test]
    fn test_excerpt_skips_headings() {
        assert_eq!(excerpt("## Intro\nHello", 50), "Intro Hello");
    }
}
