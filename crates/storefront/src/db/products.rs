//! Product and gallery image repository.
//!
//! Catalog listings only ever show available products. Lookups by ID ignore
//! availability: carts and vendor pages still need hidden products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use gebeya_core::validation::ProductInput;
use gebeya_core::{
    CategoryId, Kebele, Price, ProductId, ProductImageId, ProductSort, Slug, VendorId,
};

use super::{RepositoryError, parse_column, with_unique_slug};
use crate::models::{Product, ProductImage, ProductListing};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    category_id: i32,
    vendor_id: i32,
    name: String,
    slug: String,
    image: Option<String>,
    description: String,
    price: Decimal,
    stock: i32,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            vendor_id: VendorId::new(row.vendor_id),
            name: row.name,
            slug: Slug::from_trusted(row.slug),
            image: row.image,
            description: row.description,
            price: Price::new(row.price),
            stock: row.stock,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    product: ProductRow,
    category_name: String,
    category_slug: String,
    vendor_name: String,
    vendor_kebele: String,
    vendor_verified: bool,
}

impl TryFrom<ListingRow> for ProductListing {
    type Error = RepositoryError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product: row.product.into(),
            category_name: row.category_name,
            category_slug: Slug::from_trusted(row.category_slug),
            vendor_name: row.vendor_name,
            vendor_kebele: parse_column::<Kebele>("kebele", &row.vendor_kebele)?,
            vendor_verified: row.vendor_verified,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: i32,
    product_id: i32,
    image: String,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            product_id: ProductId::new(row.product_id),
            image: row.image,
        }
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.category_id, p.vendor_id, p.name, p.slug, p.image, \
                               p.description, p.price, p.stock, p.is_available, \
                               p.created_at, p.updated_at";

const LISTING_SELECT: &str = "SELECT p.id, p.category_id, p.vendor_id, p.name, p.slug, p.image, \
                              p.description, p.price, p.stock, p.is_available, \
                              p.created_at, p.updated_at, \
                              c.name AS category_name, c.slug AS category_slug, \
                              v.business_name AS vendor_name, v.kebele AS vendor_kebele, \
                              v.is_verified AS vendor_verified \
                              FROM products p \
                              JOIN categories c ON c.id = p.category_id \
                              JOIN vendors v ON v.id = p.vendor_id";

/// Catalog listing filters. Every filter is optional.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring of name or description.
    pub query: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Vendor neighborhood.
    pub kebele: Option<Kebele>,
    pub sort: ProductSort,
    pub limit: Option<i64>,
}

/// Escape `LIKE` metacharacters and wrap in `%...%`.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Available products matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<ProductListing>, RepositoryError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(LISTING_SELECT);
        qb.push(" WHERE p.is_available");

        if let Some(query) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = like_pattern(query);
            qb.push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            qb.push(" AND c.slug = ").push_bind(category.to_owned());
        }
        if let Some(kebele) = filter.kebele {
            qb.push(" AND v.kebele = ").push_bind(kebele.as_str());
        }

        qb.push(match filter.sort {
            ProductSort::Newest => " ORDER BY p.created_at DESC, p.id DESC",
            ProductSort::PriceLow => " ORDER BY p.price ASC, p.id",
            ProductSort::PriceHigh => " ORDER BY p.price DESC, p.id",
        });
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        qb.build_query_as::<ListingRow>()
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(ProductListing::try_from)
            .collect()
    }

    /// An available product by slug, with its category and vendor names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_listing_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductListing>, RepositoryError> {
        sqlx::query_as::<_, ListingRow>(&format!(
            "{LISTING_SELECT} WHERE p.slug = $1 AND p.is_available"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .map(ProductListing::try_from)
        .transpose()
    }

    /// A product by ID, available or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Every product among `ids` that still exists, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ANY($1)"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// All of a vendor's products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_vendor(&self, vendor_id: VendorId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p \
             WHERE p.vendor_id = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(vendor_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Available products in the same category, excluding one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(
        &self,
        product: &Product,
        limit: i64,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        sqlx::query_as::<_, ListingRow>(&format!(
            "{LISTING_SELECT} WHERE p.is_available AND p.category_id = $1 AND p.id <> $2 \
             ORDER BY p.created_at DESC LIMIT $3"
        ))
        .bind(product.category_id)
        .bind(product.id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(ProductListing::try_from)
        .collect()
    }

    /// Create a product for a vendor. The slug is made unique with a numeric
    /// suffix when taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if no free slug could be found.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        vendor_id: VendorId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let pool = self.pool;
        let row = with_unique_slug(&input.slug, |slug| async move {
            sqlx::query_as::<_, ProductRow>(&format!(
                "INSERT INTO products AS p \
                 (category_id, vendor_id, name, slug, image, description, price, stock, is_available) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 RETURNING {PRODUCT_COLUMNS}"
            ))
            .bind(input.category_id)
            .bind(vendor_id)
            .bind(&input.name)
            .bind(slug.as_str())
            .bind(input.image.as_deref())
            .bind(&input.description)
            .bind(input.price.amount())
            .bind(input.stock)
            .bind(input.is_available)
            .fetch_one(pool)
            .await
        })
        .await?;

        Ok(row.into())
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if no free slug could be found.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let pool = self.pool;
        let row = with_unique_slug(&input.slug, |slug| async move {
            sqlx::query_as::<_, ProductRow>(&format!(
                "UPDATE products AS p SET \
                 category_id = $2, name = $3, slug = $4, image = $5, description = $6, \
                 price = $7, stock = $8, is_available = $9, updated_at = NOW() \
                 WHERE p.id = $1 \
                 RETURNING {PRODUCT_COLUMNS}"
            ))
            .bind(id)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(slug.as_str())
            .bind(input.image.as_deref())
            .bind(&input.description)
            .bind(input.price.amount())
            .bind(input.stock)
            .bind(input.is_available)
            .fetch_optional(pool)
            .await
        })
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product and its gallery and reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if order lines reference the product.
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict("product has been ordered".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Take a product off the catalog without deleting it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn hide(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE products SET is_available = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Gallery images for a product, in upload order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, product_id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImageRow>(
            "SELECT id, product_id, image FROM product_images WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductImage::from).collect())
    }

    /// Add a gallery image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        image: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let row = sqlx::query_as::<_, ProductImageRow>(
            r"
            INSERT INTO product_images (product_id, image)
            VALUES ($1, $2)
            RETURNING id, product_id, image
            ",
        )
        .bind(product_id)
        .bind(image)
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

        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("honey"), "%honey%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_filter_defaults_to_newest() {
        let filter = ProductFilter::default();
        assert_eq!(filter.sort, ProductSort::Newest);
        assert!(filter.query.is_none());
    }
}
