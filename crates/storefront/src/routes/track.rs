//! Order tracking by order number and phone.
//!
//! A wrong phone number and a nonexistent order produce the same response.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::validation::{TrackOrderForm, validate_track_order};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::models::{Order, OrderItem};
use crate::page::PageContext;
use crate::state::AppState;

/// Message shown for any failed lookup.
pub const NOT_FOUND_MESSAGE: &str =
    "No order found with that order number and phone number. Please check and try again.";

/// Order tracking template.
#[derive(Template, WebTemplate)]
#[template(path = "track.html")]
pub struct TrackTemplate {
    pub page: PageContext,
    pub form: TrackOrderForm,
    pub errors: Vec<String>,
    pub order: Option<Order>,
    pub items: Vec<OrderItem>,
}

/// Display the tracking form.
#[instrument(skip(session, current))]
pub async fn form(session: Session, current: CurrentIdentity) -> Result<impl IntoResponse> {
    Ok(TrackTemplate {
        page: PageContext::load(&session, &current).await?,
        form: TrackOrderForm::default(),
        errors: Vec::new(),
        order: None,
        items: Vec::new(),
    })
}

/// Look up an order.
#[instrument(skip(state, session, current, form))]
pub async fn lookup(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Form(form): Form<TrackOrderForm>,
) -> Result<impl IntoResponse> {
    let page = PageContext::load(&session, &current).await?;

    let query = match validate_track_order(&form) {
        Ok(query) => query,
        Err(errors) => {
            return Ok(TrackTemplate {
                page,
                form,
                errors: errors.messages(),
                order: None,
                items: Vec::new(),
            });
        }
    };

    let orders = OrderRepository::new(state.pool());
    let Some(order) = orders.track(query.order_id, &query.phone).await? else {
        tracing::info!(order_id = %query.order_id, "order tracking miss");
        return Ok(TrackTemplate {
            page,
            form,
            errors: vec![NOT_FOUND_MESSAGE.to_owned()],
            order: None,
            items: Vec::new(),
        });
    };

    let items = orders.items(order.id).await?;
    Ok(TrackTemplate {
        page,
        form,
        errors: Vec::new(),
        order: Some(order),
        items,
    })
}
