//! Catalog route handlers: product listing, product detail and categories.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::{Kebele, ProductSort, RatingSummary};

use crate::db::{
    CategoryRepository, ProductFilter, ProductRepository, ReviewRepository, VendorRepository,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::models::{Category, ProductImage, ProductListing, Review, Vendor};
use crate::page::PageContext;
use crate::state::AppState;

/// Related products shown under a product.
const RELATED_PRODUCT_LIMIT: i64 = 4;

/// A product card: the listing plus its rating summary.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub listing: ProductListing,
    pub rating: RatingSummary,
}

/// Attach rating summaries to listings with a single aggregate query.
///
/// # Errors
///
/// Returns an error if the summaries cannot be loaded.
pub async fn product_cards(pool: &PgPool, listings: Vec<ProductListing>) -> Result<Vec<ProductCard>> {
    let ids: Vec<_> = listings.iter().map(|l| l.product.id).collect();
    let summaries = ReviewRepository::new(pool).summaries(&ids).await?;

    Ok(listings
        .into_iter()
        .map(|listing| {
            let rating = summaries
                .get(&listing.product.id)
                .copied()
                .unwrap_or_default();
            ProductCard { listing, rating }
        })
        .collect())
}

/// Catalog query parameters. Blank and unrecognized values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub kebele: Option<String>,
    pub sort: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl CatalogQuery {
    /// Turn the raw query into a repository filter.
    #[must_use]
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            query: non_blank(self.q.as_deref()),
            category: non_blank(self.category.as_deref()),
            kebele: self.kebele.as_deref().and_then(|k| k.parse::<Kebele>().ok()),
            sort: self
                .sort
                .as_deref()
                .and_then(|s| s.parse::<ProductSort>().ok())
                .unwrap_or_default(),
            limit: None,
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCard>,
    pub categories: Vec<Category>,
    pub kebeles: &'static [Kebele],
    pub sorts: &'static [ProductSort],
    pub query: String,
    pub selected_category: String,
    pub selected_kebele: String,
    pub selected_sort: String,
}

/// Display the product listing with search, filters and sorting.
#[instrument(skip(state, session, current))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let filter = query.to_filter();

    let listings = ProductRepository::new(pool).list(&filter).await?;
    let products = product_cards(pool, listings).await?;
    let categories = CategoryRepository::new(pool).list(None).await?;

    Ok(ProductsIndexTemplate {
        page: PageContext::load(&session, &current).await?,
        products,
        categories,
        kebeles: Kebele::ALL,
        sorts: ProductSort::ALL,
        query: filter.query.unwrap_or_default(),
        selected_category: filter.category.unwrap_or_default(),
        selected_kebele: filter.kebele.map(|k| k.as_str().to_owned()).unwrap_or_default(),
        selected_sort: filter.sort.as_str().to_owned(),
    })
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub listing: ProductListing,
    pub vendor: Option<Vendor>,
    pub images: Vec<ProductImage>,
    pub reviews: Vec<Review>,
    pub rating: RatingSummary,
    pub related: Vec<ProductCard>,
    /// Pre-filled reviewer name for logged-in users.
    pub reviewer_name: String,
}

/// Display an available product with gallery, vendor, reviews and related products.
///
/// # Errors
///
/// Returns 404 if no available product has this slug.
#[instrument(skip(state, session, current))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let products = ProductRepository::new(pool);

    let listing = products
        .get_listing_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let reviews_repo = ReviewRepository::new(pool);
    let images = products.images(listing.product.id).await?;
    let reviews = reviews_repo.list_for_product(listing.product.id).await?;
    let rating = reviews_repo.summary(listing.product.id).await?;
    let related = product_cards(
        pool,
        products
            .related(&listing.product, RELATED_PRODUCT_LIMIT)
            .await?,
    )
    .await?;
    let vendor = VendorRepository::new(pool)
        .get_by_id(listing.product.vendor_id)
        .await?;

    Ok(ProductShowTemplate {
        reviewer_name: current
            .user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_default(),
        page: PageContext::load(&session, &current).await?,
        listing,
        vendor,
        images,
        reviews,
        rating,
        related,
    })
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/category.html")]
pub struct CategoryTemplate {
    pub page: PageContext,
    pub category: Category,
    pub products: Vec<ProductCard>,
}

/// Display the available products of a category.
///
/// # Errors
///
/// Returns 404 if the category does not exist.
#[instrument(skip(state, session, current))]
pub async fn category(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let category = CategoryRepository::new(pool)
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let listings = ProductRepository::new(pool)
        .list(&ProductFilter {
            category: Some(category.slug.as_str().to_owned()),
            ..ProductFilter::default()
        })
        .await?;

    Ok(CategoryTemplate {
        page: PageContext::load(&session, &current).await?,
        products: product_cards(pool, listings).await?,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_filter() {
        let query = CatalogQuery {
            q: Some("  coffee ".to_string()),
            category: Some(String::new()),
            kebele: Some("bosa_kito".to_string()),
            sort: Some("price_high".to_string()),
        };
        let filter = query.to_filter();

        assert_eq!(filter.query.as_deref(), Some("coffee"));
        assert_eq!(filter.category, None);
        assert_eq!(filter.kebele, Some(Kebele::BosaKito));
        assert_eq!(filter.sort, ProductSort::PriceHigh);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let query = CatalogQuery {
            kebele: Some("atlantis".to_string()),
            sort: Some("random".to_string()),
            ..CatalogQuery::default()
        };
        let filter = query.to_filter();

        assert_eq!(filter.kebele, None);
        assert_eq!(filter.sort, ProductSort::Newest);
    }
}
