//! Review repository. Rating summaries are aggregated on every read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gebeya_core::validation::ReviewInput;
use gebeya_core::{ProductId, Rating, RatingSummary, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: Option<i32>,
    rating: i16,
    comment: String,
    full_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(i64::from(row.rating)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
        })?;
        Ok(Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: row.user_id.map(UserId::new),
            rating,
            comment: row.comment,
            full_name: row.full_name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    product_id: i32,
    review_count: i64,
    rating_sum: i64,
}

impl TotalsRow {
    fn summary(&self) -> RatingSummary {
        RatingSummary::from_totals(
            u64::try_from(self.review_count).unwrap_or(0),
            u64::try_from(self.rating_sum).unwrap_or(0),
        )
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, product_id, user_id, rating, comment, full_name, created_at
            FROM product_reviews
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Review::try_from)
        .collect()
    }

    /// Average rating and count for one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, product_id: ProductId) -> Result<RatingSummary, RepositoryError> {
        let summaries = self.summaries(&[product_id]).await?;
        Ok(summaries.get(&product_id).copied().unwrap_or_default())
    }

    /// Summaries for many products. Products without reviews are absent
    /// from the map; treat them as [`RatingSummary::default`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summaries(
        &self,
        product_ids: &[ProductId],
    ) -> Result<HashMap<ProductId, RatingSummary>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let raw: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, TotalsRow>(
            r"
            SELECT product_id,
                   COUNT(*) AS review_count,
                   COALESCE(SUM(rating), 0)::BIGINT AS rating_sum
            FROM product_reviews
            WHERE product_id = ANY($1)
            GROUP BY product_id
            ",
        )
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| (ProductId::new(row.product_id), row.summary()))
            .collect())
    }

    /// Store a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: Option<UserId>,
        input: &ReviewInput,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            INSERT INTO product_reviews (product_id, user_id, rating, comment, full_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, user_id, rating, comment, full_name, created_at
            ",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(i16::from(input.rating.value()))
        .bind(&input.comment)
        .bind(&input.full_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Review::try_from(row)
    }
}
