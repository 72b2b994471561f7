//! Review submission.

use axum::{
    Form,
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::ProductId;
use gebeya_core::validation::{ReviewForm, validate_review};

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentIdentity;
use crate::models::FlashMessage;
use crate::page::redirect_with;
use crate::state::AppState;

/// Store a review and return to the product page.
///
/// Invalid input is reported as a flash message on the product page.
///
/// # Errors
///
/// Returns 404 if the product does not exist or is hidden.
#[instrument(skip(state, session, current, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Path(id): Path<ProductId>,
    Form(form): Form<ReviewForm>,
) -> Result<impl IntoResponse> {
    let pool = state.pool();
    let product = ProductRepository::new(pool)
        .get_by_id(id)
        .await?
        .filter(|product| product.is_available)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let back = format!("/product/{}/", product.slug);

    let input = match validate_review(&form) {
        Ok(input) => input,
        Err(errors) => {
            let message = format!("Your review could not be saved: {errors}.");
            return redirect_with(&session, FlashMessage::error(message), &back).await;
        }
    };

    let review = ReviewRepository::new(pool)
        .create(product.id, current.identity.user_id(), &input)
        .await?;
    tracing::info!(review_id = %review.id, product_id = %product.id, "review submitted");

    redirect_with(
        &session,
        FlashMessage::success("Thank you! Your review has been submitted."),
        &back,
    )
    .await
}
