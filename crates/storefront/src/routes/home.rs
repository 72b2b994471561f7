//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{CategoryRepository, ProductFilter, ProductRepository, VendorRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::models::{Category, Vendor};
use crate::page::PageContext;
use crate::routes::catalog::{ProductCard, product_cards};
use crate::state::AppState;

/// Categories shown on the home page.
const HOME_CATEGORY_LIMIT: i64 = 6;
/// Featured products shown on the home page.
const FEATURED_PRODUCT_LIMIT: i64 = 8;
/// Verified vendors shown on the home page.
const FEATURED_VENDOR_LIMIT: i64 = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub categories: Vec<Category>,
    pub featured_products: Vec<ProductCard>,
    pub vendors: Vec<Vendor>,
}

/// Display the home page.
#[instrument(skip(state, session, current))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
) -> Result<impl IntoResponse> {
    let pool = state.pool();

    let categories = CategoryRepository::new(pool)
        .list(Some(HOME_CATEGORY_LIMIT))
        .await?;
    let listings = ProductRepository::new(pool)
        .list(&ProductFilter {
            limit: Some(FEATURED_PRODUCT_LIMIT),
            ..ProductFilter::default()
        })
        .await?;
    let featured_products = product_cards(pool, listings).await?;
    let vendors = VendorRepository::new(pool)
        .list_verified(FEATURED_VENDOR_LIMIT)
        .await?;

    Ok(HomeTemplate {
        page: PageContext::load(&session, &current).await?,
        categories,
        featured_products,
        vendors,
    })
}
