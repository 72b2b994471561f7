//! Order domain types.

use chrono::{DateTime, Utc};

use gebeya_core::{
    DeliveryTimeSlot, Kebele, OrderId, OrderItemId, OrderStatus, PaymentMethod, Price, ProductId,
    UserId, VendorId,
};

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Buyer account, if the buyer was logged in and still exists.
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: Option<String>,
    /// Normalized phone number, used for tracking lookups.
    pub phone: String,
    pub address: String,
    pub kebele: Kebele,
    pub delivery_time_slot: DeliveryTimeSlot,
    /// Sum of the line snapshots at checkout.
    pub total_price: Price,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// One line of an order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub vendor_id: VendorId,
    /// Unit price at checkout.
    pub price: Price,
    pub quantity: u32,
}

impl OrderItem {
    /// `price × quantity`.
    #[must_use]
    pub fn total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An order line for one of a vendor's products, with its order.
#[derive(Debug, Clone)]
pub struct VendorOrderItem {
    pub item: OrderItem,
    pub order: Order,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_total_uses_snapshot_price() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: ProductId::new(3),
            product_name: "Cotton Scarf".to_string(),
            vendor_id: VendorId::new(1),
            price: Price::from_cents(120_000),
            quantity: 3,
        };
        assert_eq!(item.total(), Price::from_cents(360_000));
    }
}
