//! Checkout and order confirmation.
//!
//! Placing an order freezes each line's current price, writes the order and
//! its lines in one transaction, then empties the cart. Stock is not
//! decremented.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::validation::{CheckoutForm, validate_checkout};
use gebeya_core::{
    CheckoutError, DeliveryTimeSlot, Kebele, OrderDraft, OrderId, PaymentMethod, PricedCart,
    ProductId,
};

use crate::cart_session::{clear_cart, load_cart, placed_order, remember_placed_order};
use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::models::{FlashMessage, Order, OrderItem, Product};
use crate::page::{PageContext, push_flash};
use crate::routes::cart::price_cart;
use crate::state::AppState;

/// Where an empty cart is sent instead of the checkout form.
const EMPTY_CART_REDIRECT: &str = "/products/";

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: PricedCart<Product>,
    pub form: CheckoutForm,
    pub errors: Vec<String>,
    pub kebeles: &'static [Kebele],
    pub time_slots: &'static [DeliveryTimeSlot],
    pub payment_methods: &'static [PaymentMethod],
}

impl CheckoutTemplate {
    fn new(
        page: PageContext,
        cart: PricedCart<Product>,
        form: CheckoutForm,
        errors: Vec<String>,
    ) -> Self {
        Self {
            page,
            cart,
            form,
            errors,
            kebeles: Kebele::ALL,
            time_slots: DeliveryTimeSlot::ALL,
            payment_methods: PaymentMethod::ALL,
        }
    }
}

/// Display the checkout form.
#[instrument(skip(state, session, current))]
pub async fn form(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to(EMPTY_CART_REDIRECT).into_response());
    }

    let priced = price_cart(state.pool(), &cart).await?;
    let page = PageContext::load(&session, &current).await?;
    let form = CheckoutForm {
        payment_method: PaymentMethod::CashOnDelivery.as_str().to_owned(),
        ..CheckoutForm::default()
    };

    Ok(CheckoutTemplate::new(page, priced, form, Vec::new()).into_response())
}

/// Place an order from the cart.
///
/// # Errors
///
/// Returns 404 if a product in the cart no longer exists. An order too
/// large to record re-renders the form with a message.
#[instrument(skip(state, session, current, form))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let pool = state.pool();
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to(EMPTY_CART_REDIRECT).into_response());
    }

    let contact = match validate_checkout(&form) {
        Ok(contact) => contact,
        Err(errors) => {
            let priced = price_cart(pool, &cart).await?;
            let page = PageContext::load(&session, &current).await?;
            return Ok(
                CheckoutTemplate::new(page, priced, form, errors.messages()).into_response(),
            );
        }
    };

    let prices: HashMap<ProductId, _> = ProductRepository::new(pool)
        .get_many(&cart.product_ids())
        .await?
        .into_iter()
        .map(|p| (p.id, p.price))
        .collect();

    let draft = match OrderDraft::from_cart(
        &cart,
        |id| prices.get(&id).copied(),
        contact,
        current.identity.user_id(),
    ) {
        Ok(draft) => draft,
        Err(err @ CheckoutError::OrderTooLarge) => {
            tracing::warn!(error = %err, "checkout rejected");
            let priced = price_cart(pool, &cart).await?;
            let page = PageContext::load(&session, &current).await?;
            return Ok(
                CheckoutTemplate::new(page, priced, form, vec![err.to_string()]).into_response(),
            );
        }
        Err(err) => return Err(err.into()),
    };

    let order_id = OrderRepository::new(pool).place(&draft).await?;
    tracing::info!(
        order_id = %order_id,
        lines = draft.lines.len(),
        total = %draft.total_price.amount(),
        "order placed"
    );

    clear_cart(&session).await?;
    remember_placed_order(&session, order_id).await?;
    push_flash(
        &session,
        FlashMessage::success("Your order has been placed. Thank you for shopping with Gebeya!"),
    )
    .await?;

    Ok(Redirect::to(&format!("/order/success/{order_id}/")).into_response())
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct OrderSuccessTemplate {
    pub page: PageContext,
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Display an order confirmation.
///
/// Only the session that placed the order, the ordering user and admins may
/// see it. Everyone else gets a 404.
///
/// # Errors
///
/// Returns 404 if the order does not exist or is not visible to the requester.
#[instrument(skip(state, session, current))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool());
    let not_found = || AppError::NotFound(format!("order {id}"));

    let order = orders.get(id).await?.ok_or_else(not_found)?;

    let visible = current.identity.is_admin()
        || (order.user_id.is_some() && order.user_id == current.identity.user_id())
        || placed_order(&session, id).await?;
    if !visible {
        return Err(not_found());
    }

    let items = orders.items(id).await?;

    Ok(OrderSuccessTemplate {
        page: PageContext::load(&session, &current).await?,
        order,
        items,
    })
}
