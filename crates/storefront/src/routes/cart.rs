//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Totals are always computed from
//! current product prices; prices are only frozen when an order is placed.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::validation::parse_quantity;
use gebeya_core::{Cart, PricedCart, ProductId};

use crate::cart_session::{load_cart, save_cart};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::models::{FlashMessage, Product};
use crate::page::{PageContext, redirect_with};
use crate::state::AppState;

const CART_PATH: &str = "/cart/";

/// Price a cart against the products' current prices.
///
/// Products deleted since they were added are skipped.
///
/// # Errors
///
/// Returns an error if the products cannot be loaded.
pub async fn price_cart(pool: &PgPool, cart: &Cart) -> Result<PricedCart<Product>> {
    if cart.is_empty() {
        return Ok(cart.price::<Product, _>(|_| None));
    }

    let products: HashMap<ProductId, Product> = ProductRepository::new(pool)
        .get_many(&cart.product_ids())
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(cart.price(|id| products.get(&id).map(|p| (p.clone(), p.price))))
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub cart: PricedCart<Product>,
}

/// Display the cart with current prices.
#[instrument(skip(state, session, current))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    let priced = price_cart(state.pool(), &cart).await?;

    Ok(CartTemplate {
        page: PageContext::load(&session, &current).await?,
        cart: priced,
    })
}

/// Add-to-cart form data.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    /// Defaults to 1 when absent or blank.
    pub quantity: Option<String>,
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    if !product.is_available {
        return redirect_with(
            &session,
            FlashMessage::error(format!("{} is no longer available.", product.name)),
            CART_PATH,
        )
        .await;
    }

    let quantity = match parse_quantity(form.quantity.as_deref()) {
        Ok(quantity) => quantity,
        Err(err) => {
            return redirect_with(&session, FlashMessage::error(err.to_string()), CART_PATH).await;
        }
    };

    let mut cart = load_cart(&session).await?;
    cart.add(product.id, quantity);
    save_cart(&session, &cart).await?;

    tracing::debug!(product_id = %product.id, quantity, "added to cart");
    redirect_with(
        &session,
        FlashMessage::success(format!("{} added to cart.", product.name)),
        CART_PATH,
    )
    .await
}

/// Remove a product from the cart. Removing an absent product does nothing.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<ProductId>) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(id) {
        save_cart(&session, &cart).await?;
        return redirect_with(&session, FlashMessage::info("Item removed from cart."), CART_PATH)
            .await;
    }
    Ok(axum::response::Redirect::to(CART_PATH))
}
