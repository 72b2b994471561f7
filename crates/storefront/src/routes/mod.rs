//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                 - Home page
//! GET  /health, /health/ready            - Health checks (see main.rs)
//!
//! # Catalog
//! GET  /products/                        - Product listing (q, category, kebele, sort)
//! GET  /product/{slug}/                  - Product detail
//! POST /product/review/{id}/             - Submit a review
//! GET  /category/{slug}/                 - Category listing
//!
//! # Cart & checkout
//! GET  /cart/                            - Cart page
//! POST /cart/add/{id}/                   - Add to cart (quantity)
//! POST /cart/remove/{id}/                - Remove from cart
//! GET  /checkout/                        - Checkout form
//! POST /checkout/                        - Place order
//! GET  /order/success/{id}/              - Order confirmation
//! GET  /track-order/                     - Tracking form
//! POST /track-order/                     - Look up an order (rate limited)
//!
//! # Vendor (login required)
//! GET  /vendor/register/                 - Registration form
//! POST /vendor/register/                 - Register as vendor
//! GET  /vendor/dashboard/                - Products and incoming orders
//! GET  /vendor/product/add/              - New product form
//! POST /vendor/product/add/              - Create product
//! GET  /vendor/product/edit/{id}/        - Edit product form
//! POST /vendor/product/edit/{id}/        - Update product
//! POST /vendor/product/delete/{id}/      - Delete (or hide) product
//! POST /vendor/product/{id}/images/      - Add gallery image
//! POST /vendor/order/status/{id}/        - Update order status
//!
//! # Accounts (rate limited)
//! GET  /signup/, POST /signup/           - Create account
//! GET  /login/, POST /login/             - Log in
//! POST /logout/                          - Log out
//!
//! # Content
//! GET  /blog/, /blog/{slug}/             - Articles
//! GET  /about/, /how-it-works/, /seller-info/, /delivery-info/, /contact/
//! ```

pub mod auth;
pub mod blog;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod home;
pub mod pages;
pub mod reviews;
pub mod track;
pub mod vendor;

use axum::{
    Router,
    handler::Handler,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, tracking_rate_limiter};
use crate::state::AppState;

/// Create the catalog routes router.
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(catalog::index))
        .route("/product/{slug}/", get(catalog::show))
        .route("/product/review/{id}/", post(reviews::submit))
        .route("/category/{slug}/", get(catalog::category))
}

/// Create the cart and checkout routes router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/", get(cart::show))
        .route("/cart/add/{id}/", post(cart::add))
        .route("/cart/remove/{id}/", post(cart::remove))
        .route("/checkout/", get(checkout::form).post(checkout::place))
        .route("/order/success/{id}/", get(checkout::success))
        .route(
            "/track-order/",
            get(track::form).post(track::lookup.layer(tracking_rate_limiter())),
        )
}

/// Create the vendor dashboard routes router.
fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", get(vendor::register_form).post(vendor::register))
        .route("/dashboard/", get(vendor::dashboard))
        .route(
            "/product/add/",
            get(vendor::new_product).post(vendor::create_product),
        )
        .route(
            "/product/edit/{id}/",
            get(vendor::edit_product).post(vendor::update_product),
        )
        .route("/product/delete/{id}/", post(vendor::delete_product))
        .route("/product/{id}/images/", post(vendor::add_image))
        .route("/order/status/{id}/", post(vendor::update_order_status))
}

/// Create the account routes router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/signup/",
            get(auth::signup_page).post(auth::signup.layer(auth_rate_limiter())),
        )
        .route(
            "/login/",
            get(auth::login_page).post(auth::login.layer(auth_rate_limiter())),
        )
        .route("/logout/", post(auth::logout))
}

/// Create the static content routes router.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about/", get(pages::about))
        .route("/how-it-works/", get(pages::how_it_works))
        .route("/seller-info/", get(pages::seller_info))
        .route("/delivery-info/", get(pages::delivery_info))
        .route("/contact/", get(pages::contact))
        .route("/blog/", get(blog::index))
        .route("/blog/{slug}/", get(blog::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(catalog_routes())
        .merge(cart_routes())
        .nest("/vendor", vendor_routes())
        .merge(auth_routes())
        .merge(page_routes())
}
