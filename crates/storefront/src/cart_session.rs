//! Session persistence for the cart and for orders placed from a session.
//!
//! Handlers load the cart, change it and save it back explicitly. A session
//! whose stored cart cannot be decoded starts over with an empty cart.

use tower_sessions::Session;

use gebeya_core::{Cart, OrderId};

use crate::models::session_keys;

/// Most recent orders remembered per session for the confirmation page.
const MAX_PLACED_ORDERS: usize = 20;

/// Load the visitor's cart, empty if none is stored.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(tower_sessions::session::Error::SerdeJson(err)) => {
            tracing::warn!(error = %err, "discarding undecodable cart");
            Ok(Cart::new())
        }
        Err(err) => Err(err),
    }
}

/// Store the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Remove the cart from the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn clear_cart(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Cart>(session_keys::CART).await?;
    Ok(())
}

/// Remember that this session placed an order.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn remember_placed_order(
    session: &Session,
    order_id: OrderId,
) -> Result<(), tower_sessions::session::Error> {
    let mut placed = placed_orders(session).await?;
    remember(&mut placed, order_id);
    session.insert(session_keys::PLACED_ORDERS, placed).await
}

/// Whether this session placed the given order.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn placed_order(
    session: &Session,
    order_id: OrderId,
) -> Result<bool, tower_sessions::session::Error> {
    Ok(placed_orders(session).await?.contains(&order_id))
}

async fn placed_orders(session: &Session) -> Result<Vec<OrderId>, tower_sessions::session::Error> {
    Ok(session
        .get::<Vec<OrderId>>(session_keys::PLACED_ORDERS)
        .await?
        .unwrap_or_default())
}

fn remember(placed: &mut Vec<OrderId>, order_id: OrderId) {
    if !placed.contains(&order_id) {
        placed.push(order_id);
    }
    if placed.len() > MAX_PLACED_ORDERS {
        let excess = placed.len() - MAX_PLACED_ORDERS;
        placed.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use gebeya_core::ProductId;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_cart_round_trip_through_session() {
        let session = session();
        assert!(load_cart(&session).await.expect("load").is_empty());

        let mut cart = load_cart(&session).await.expect("load");
        cart.add(ProductId::new(3), 2);
        save_cart(&session, &cart).await.expect("save");

        let loaded = load_cart(&session).await.expect("load");
        assert_eq!(loaded.quantity_of(ProductId::new(3)), Some(2));

        clear_cart(&session).await.expect("clear");
        assert!(load_cart(&session).await.expect("load").is_empty());
    }

    #[tokio::test]
    async fn test_placed_orders_are_remembered() {
        let session = session();
        remember_placed_order(&session, OrderId::new(7))
            .await
            .expect("remember");

        assert!(placed_order(&session, OrderId::new(7)).await.expect("read"));
        assert!(!placed_order(&session, OrderId::new(8)).await.expect("read"));
    }

    #[test]
    fn test_remember_keeps_most_recent() {
        let mut placed = Vec::new();
        for id in 0..25 {
            remember(&mut placed, OrderId::new(id));
        }
        remember(&mut placed, OrderId::new(24));

        assert_eq!(placed.len(), MAX_PLACED_ORDERS);
        assert_eq!(placed.first(), Some(&OrderId::new(5)));
        assert_eq!(placed.last(), Some(&OrderId::new(24)));
    }
}
