//! Per-page context shared by every template, and flash messages.
//!
//! Flash messages are queued in the session by one request and consumed by
//! the next request that renders a page. Redirect-only handlers never read
//! them.

use axum::response::Redirect;
use tower_sessions::Session;

use crate::cart_session::load_cart;
use crate::error::AppError;
use crate::middleware::CurrentIdentity;
use crate::models::{FlashMessage, session_keys};

/// Header and message data every layout needs.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Logged-in user's name, if any.
    pub username: Option<String>,
    pub is_vendor: bool,
    pub is_admin: bool,
    /// Units in the cart, for the header badge.
    pub cart_count: u32,
    /// Messages to show once on this page.
    pub flashes: Vec<FlashMessage>,
}

impl PageContext {
    /// Build the context for a rendered page, consuming pending flashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn load(session: &Session, current: &CurrentIdentity) -> Result<Self, AppError> {
        let cart = load_cart(session).await?;
        let flashes = take_flashes(session).await?;

        Ok(Self {
            username: current.user.as_ref().map(|u| u.username.clone()),
            is_vendor: current.identity.vendor_id().is_some(),
            is_admin: current.identity.is_admin(),
            cart_count: cart.item_count(),
            flashes,
        })
    }
}

/// Queue a flash message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn push_flash(
    session: &Session,
    message: FlashMessage,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending = session
        .get::<Vec<FlashMessage>>(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    pending.push(message);
    session.insert(session_keys::FLASH, pending).await
}

/// Remove and return all pending flash messages.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn take_flashes(
    session: &Session,
) -> Result<Vec<FlashMessage>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<FlashMessage>>(session_keys::FLASH)
        .await?
        .unwrap_or_default())
}

/// Queue a flash message and redirect.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn redirect_with(
    session: &Session,
    message: FlashMessage,
    to: &str,
) -> Result<Redirect, AppError> {
    push_flash(session, message).await?;
    Ok(Redirect::to(to))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use gebeya_core::{Cart, Identity, ProductId, UserId, VendorId};

    use super::*;
    use crate::cart_session::save_cart;
    use crate::models::{CurrentUser, FlashKind};

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flashes_are_shown_once() {
        let session = session();
        push_flash(&session, FlashMessage::success("Saved"))
            .await
            .expect("push");
        push_flash(&session, FlashMessage::error("But not this"))
            .await
            .expect("push");

        let first = take_flashes(&session).await.expect("take");
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, FlashKind::Success);
        assert!(take_flashes(&session).await.expect("take").is_empty());
    }

    #[tokio::test]
    async fn test_page_context_for_vendor() {
        let session = session();
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), 2);
        cart.add(ProductId::new(2), 1);
        save_cart(&session, &cart).await.expect("save");

        let current = CurrentIdentity {
            user: Some(CurrentUser {
                id: UserId::new(5),
                username: "abebe".to_string(),
            }),
            identity: Identity::Vendor {
                user_id: UserId::new(5),
                vendor_id: VendorId::new(2),
            },
        };

        let page = PageContext::load(&session, &current).await.expect("load");
        assert_eq!(page.username.as_deref(), Some("abebe"));
        assert!(page.is_vendor);
        assert!(!page.is_admin);
        assert_eq!(page.cart_count, 3);
    }
}
