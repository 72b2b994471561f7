//! Static information pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::{DeliveryTimeSlot, Kebele, PaymentMethod};

use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::page::PageContext;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
}

/// How-it-works page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/how_it_works.html")]
pub struct HowItWorksTemplate {
    pub page: PageContext,
}

/// Seller information page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/seller_info.html")]
pub struct SellerInfoTemplate {
    pub page: PageContext,
}

/// Delivery information page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/delivery_info.html")]
pub struct DeliveryInfoTemplate {
    pub page: PageContext,
    pub kebeles: &'static [Kebele],
    pub time_slots: &'static [DeliveryTimeSlot],
    pub payment_methods: &'static [PaymentMethod],
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
}

/// Display the About page.
#[instrument(skip(session, current))]
pub async fn about(session: Session, current: CurrentIdentity) -> Result<impl IntoResponse> {
    Ok(AboutTemplate {
        page: PageContext::load(&session, &current).await?,
    })
}

/// Display the How It Works page.
#[instrument(skip(session, current))]
pub async fn how_it_works(session: Session, current: CurrentIdentity) -> Result<impl IntoResponse> {
    Ok(HowItWorksTemplate {
        page: PageContext::load(&session, &current).await?,
    })
}

/// Display the seller information page.
#[instrument(skip(session, current))]
pub async fn seller_info(session: Session, current: CurrentIdentity) -> Result<impl IntoResponse> {
    Ok(SellerInfoTemplate {
        page: PageContext::load(&session, &current).await?,
    })
}

/// Display the delivery information page.
#[instrument(skip(session, current))]
pub async fn delivery_info(
    session: Session,
    current: CurrentIdentity,
) -> Result<impl IntoResponse> {
    Ok(DeliveryInfoTemplate {
        page: PageContext::load(&session, &current).await?,
        kebeles: Kebele::ALL,
        time_slots: DeliveryTimeSlot::ALL,
        payment_methods: PaymentMethod::ALL,
    })
}

/// Display the contact page.
#[instrument(skip(session, current))]
pub async fn contact(session: Session, current: CurrentIdentity) -> Result<impl IntoResponse> {
    Ok(ContactTemplate {
        page: PageContext::load(&session, &current).await?,
    })
}
