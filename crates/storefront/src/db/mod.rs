//! Database operations for the marketplace `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users`, `profiles` - Site accounts and their marketplace role
//! - `categories`, `vendors`, `products`, `product_images` - Catalog
//! - `product_reviews` - Buyer reviews, aggregated on read
//! - `orders`, `order_items` - Orders with per-line price snapshots
//! - `articles` - Blog posts (Markdown)
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p gebeya-cli -- migrate
//! ```

pub mod articles;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;
pub mod vendors;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use gebeya_core::Slug;

pub use articles::ArticleRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::{ProductFilter, ProductRepository};
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use vendors::VendorRepository;

/// How many suffixed slugs to try before giving up.
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in database is invalid or corrupted.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint or foreign key restriction violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a `TEXT` column into a typed choice, reporting corruption on failure.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

/// Whether an error is a unique violation on a `slug` column.
fn is_slug_conflict(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation()
                && db_err.constraint().is_some_and(|c| c.ends_with("slug_key"))
    )
}

/// Run a write that stores `base`, retrying with `base-2`, `base-3`, ... while
/// the slug is already taken.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` once [`MAX_SLUG_ATTEMPTS`] candidates
/// have collided, or `RepositoryError::Database` for any other failure.
pub(crate) async fn with_unique_slug<T, F, Fut>(
    base: &Slug,
    mut write: F,
) -> Result<T, RepositoryError>
where
    F: FnMut(Slug) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = if attempt == 1 {
            base.clone()
        } else {
            base.with_suffix(attempt)
        };
        match write(candidate).await {
            Ok(value) => return Ok(value),
            Err(e) if is_slug_conflict(&e) => {
                tracing::debug!(slug = %base, attempt, "slug taken, trying next suffix");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(RepositoryError::Conflict(format!(
        "no free slug for '{base}' after {MAX_SLUG_ATTEMPTS} attempts"
    )))
}

#[cfg(test)]
mod tests {
    use gebeya_core::OrderStatus;

    use super::*;

    #[test]
    fn test_parse_column() {
        let status: Result<OrderStatus, _> = parse_column("status", "shipped");
        assert!(matches!(status, Ok(OrderStatus::Shipped)));

        let status: Result<OrderStatus, _> = parse_column("status", "Shipped!");
        assert!(matches!(status, Err(RepositoryError::DataCorruption(_))));
    }

    #[tokio::test]
    async fn test_with_unique_slug_returns_first_success() {
        let base = Slug::from_name("Organic Honey");
        let result = with_unique_slug(&base, |slug| async move {
            Ok::<_, sqlx::Error>(slug.as_str().to_owned())
        })
        .await;
        assert!(matches!(result.as_deref(), Ok("organic-honey")));
    }

    #[tokio::test]
    async fn test_with_unique_slug_propagates_other_errors() {
        let base = Slug::from_name("Cotton Scarf");
        let result: Result<(), _> =
            with_unique_slug(&base, |_| async { Err(sqlx::Error::RowNotFound) }).await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }
}
