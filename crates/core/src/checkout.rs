//! Checkout: turning a cart into an order draft.
//!
//! The draft captures each product's price at the moment of checkout. Once
//! persisted, those line prices are the record of what the buyer owes; later
//! product price changes never touch them.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{
    DeliveryTimeSlot, Email, Kebele, OrderStatus, PaymentMethod, Phone, Price, ProductId, UserId,
};

/// Errors that stop a checkout.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to check out.
    #[error("cart is empty")]
    EmptyCart,
    /// A cart entry refers to a product that no longer exists.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    /// A quantity or the order total exceeds what an order can record.
    #[error("order is too large; please reduce the quantities in your cart")]
    OrderTooLarge,
}

/// Largest quantity a single order line can record.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Validated buyer details submitted with the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: Option<Email>,
    pub phone: Phone,
    pub address: String,
    pub kebele: Kebele,
    pub delivery_time_slot: DeliveryTimeSlot,
    pub payment_method: PaymentMethod,
}

/// One order line with its price snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineDraft {
    pub product_id: ProductId,
    /// Unit price captured at checkout.
    pub price: Price,
    pub quantity: u32,
}

impl OrderLineDraft {
    /// `price × quantity`.
    #[must_use]
    pub fn total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An order ready to be written: one header plus one line per cart entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: Option<UserId>,
    pub contact: ContactDetails,
    pub status: OrderStatus,
    pub total_price: Price,
    pub lines: Vec<OrderLineDraft>,
}

impl OrderDraft {
    /// Build a draft from a cart.
    ///
    /// `current_price` resolves a product to its price right now. Unlike cart
    /// display, a missing product here aborts the checkout.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if the cart has no entries
    /// - [`CheckoutError::ProductNotFound`] for the first entry that cannot be resolved
    /// - [`CheckoutError::OrderTooLarge`] if a quantity or the total cannot be stored
    pub fn from_cart<F>(
        cart: &Cart,
        mut current_price: F,
        contact: ContactDetails,
        user_id: Option<UserId>,
    ) -> Result<Self, CheckoutError>
    where
        F: FnMut(ProductId) -> Option<Price>,
    {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let lines = cart
            .entries()
            .map(|entry| {
                current_price(entry.product_id)
                    .map(|price| OrderLineDraft {
                        product_id: entry.product_id,
                        price,
                        quantity: entry.quantity,
                    })
                    .ok_or(CheckoutError::ProductNotFound(entry.product_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if lines.iter().any(|line| line.quantity > MAX_LINE_QUANTITY) {
            return Err(CheckoutError::OrderTooLarge);
        }

        let total_price: Price = lines.iter().map(OrderLineDraft::total).sum();
        if !total_price.is_storable() {
            return Err(CheckoutError::OrderTooLarge);
        }

        Ok(Self {
            user_id,
            contact,
            status: OrderStatus::default(),
            total_price,
            lines,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            full_name: "Chala Jimma".to_string(),
            email: None,
            phone: Phone::parse("0911223344").unwrap(),
            address: "Near Jimma University main gate".to_string(),
            kebele: Kebele::Hermata,
            delivery_time_slot: DeliveryTimeSlot::Morning,
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }

    #[test]
    fn test_two_line_order_totals() {
        let p1 = ProductId::new(1);
        let p2 = ProductId::new(2);
        let mut cart = Cart::new();
        cart.add(p1, 2);
        cart.add(p2, 1);

        let prices: HashMap<ProductId, Price> = [
            (p1, Price::from_cents(10_000)),
            (p2, Price::from_cents(5_000)),
        ]
        .into_iter()
        .collect();

        let draft =
            OrderDraft::from_cart(&cart, |id| prices.get(&id).copied(), contact(), None).unwrap();

        assert_eq!(draft.total_price, Price::from_cents(25_000));
        assert_eq!(draft.status, OrderStatus::Pending);
        assert_eq!(
            draft.lines,
            vec![
                OrderLineDraft {
                    product_id: p1,
                    price: Price::from_cents(10_000),
                    quantity: 2,
                },
                OrderLineDraft {
                    product_id: p2,
                    price: Price::from_cents(5_000),
                    quantity: 1,
                },
            ]
        );
    }

    #[test]
    fn test_one_line_per_distinct_product() {
        let mut cart = Cart::new();
        for id in 1..=4 {
            cart.add(ProductId::new(id), 1);
        }
        cart.add(ProductId::new(2), 3);

        let draft = OrderDraft::from_cart(
            &cart,
            |_| Some(Price::from_cents(100)),
            contact(),
            Some(UserId::new(7)),
        )
        .unwrap();

        assert_eq!(draft.lines.len(), cart.len());
        assert_eq!(draft.total_price, Price::from_cents(700));
        assert_eq!(draft.user_id, Some(UserId::new(7)));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_price_changes() {
        let p1 = ProductId::new(1);
        let mut cart = Cart::new();
        cart.add(p1, 1);

        let mut catalog: HashMap<ProductId, Price> =
            [(p1, Price::from_cents(800))].into_iter().collect();
        let draft =
            OrderDraft::from_cart(&cart, |id| catalog.get(&id).copied(), contact(), None).unwrap();

        catalog.insert(p1, Price::from_cents(1_200));

        assert_eq!(draft.lines[0].price, Price::from_cents(800));
        assert_eq!(draft.total_price, Price::from_cents(800));
    }

    #[test]
    fn test_empty_cart() {
        let result = OrderDraft::from_cart(&Cart::new(), |_| None, contact(), None);
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_total_beyond_storable_limit() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), 2);

        let result = OrderDraft::from_cart(
            &cart,
            |_| Some(Price::max_storable()),
            contact(),
            None,
        );
        assert_eq!(result, Err(CheckoutError::OrderTooLarge));
    }

    #[test]
    fn test_quantity_beyond_line_limit() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), MAX_LINE_QUANTITY + 1);

        let result = OrderDraft::from_cart(&cart, |_| Some(Price::ZERO), contact(), None);
        assert_eq!(result, Err(CheckoutError::OrderTooLarge));
    }

    #[test]
    fn test_missing_product_aborts() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), 1);
        cart.add(ProductId::new(2), 1);

        let result = OrderDraft::from_cart(
            &cart,
            |id| (id == ProductId::new(1)).then(|| Price::from_cents(100)),
            contact(),
            None,
        );
        assert_eq!(result, Err(CheckoutError::ProductNotFound(ProductId::new(2))));
    }
}
