//! Order repository.
//!
//! Orders are written once at checkout and afterwards only their status
//! changes. They are never deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use gebeya_core::{
    DeliveryTimeSlot, Kebele, OrderDraft, OrderId, OrderItemId, OrderStatus, PaymentMethod, Phone,
    Price, ProductId, UserId, VendorId,
};

use super::{RepositoryError, parse_column};
use crate::models::{Order, OrderItem, VendorOrderItem};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    full_name: String,
    email: Option<String>,
    phone: String,
    address: String,
    kebele: String,
    delivery_time_slot: String,
    total_price: Decimal,
    payment_method: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            kebele: parse_column::<Kebele>("kebele", &row.kebele)?,
            delivery_time_slot: parse_column::<DeliveryTimeSlot>(
                "delivery_time_slot",
                &row.delivery_time_slot,
            )?,
            total_price: Price::new(row.total_price),
            payment_method: parse_column::<PaymentMethod>("payment_method", &row.payment_method)?,
            status: parse_column::<OrderStatus>("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    vendor_id: i32,
    price: Decimal,
    quantity: i32,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid quantity in database: {}", row.quantity))
        })?;
        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            vendor_id: VendorId::new(row.vendor_id),
            price: Price::new(row.price),
            quantity,
        })
    }
}

/// An order line joined with its order. The order's columns keep their
/// plain names; the line's ID is aliased.
#[derive(Debug, sqlx::FromRow)]
struct VendorOrderItemRow {
    item_id: i32,
    product_id: i32,
    product_name: String,
    vendor_id: i32,
    price: Decimal,
    quantity: i32,
    #[sqlx(flatten)]
    order: OrderRow,
}

impl TryFrom<VendorOrderItemRow> for VendorOrderItem {
    type Error = RepositoryError;

    fn try_from(row: VendorOrderItemRow) -> Result<Self, Self::Error> {
        let item = OrderItem::try_from(OrderItemRow {
            id: row.item_id,
            order_id: row.order.id,
            product_id: row.product_id,
            product_name: row.product_name,
            vendor_id: row.vendor_id,
            price: row.price,
            quantity: row.quantity,
        })?;
        Ok(Self {
            item,
            order: Order::try_from(row.order)?,
        })
    }
}

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.full_name, o.email, o.phone, o.address, \
                             o.kebele, o.delivery_time_slot, o.total_price, \
                             o.payment_method, o.status, o.created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write an order and all of its lines in one transaction.
    ///
    /// Either everything is stored or nothing is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a product was deleted between
    /// pricing and insertion.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn place(&self, draft: &OrderDraft) -> Result<OrderId, RepositoryError> {
        let contact = &draft.contact;
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO orders (user_id, full_name, email, phone, address, kebele,
                                delivery_time_slot, total_price, payment_method, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(draft.user_id)
        .bind(&contact.full_name)
        .bind(contact.email.as_ref().map(|e| e.as_str()))
        .bind(contact.phone.as_str())
        .bind(&contact.address)
        .bind(contact.kebele.as_str())
        .bind(contact.delivery_time_slot.as_str())
        .bind(draft.total_price.amount())
        .bind(contact.payment_method.as_str())
        .bind(draft.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
            })?;
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, price, quantity)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.price.amount())
            .bind(quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::NotFound;
                }
                RepositoryError::Database(e)
            })?;
        }

        tx.commit().await?;
        Ok(OrderId::new(order_id))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Order::try_from)
        .transpose()
    }

    /// Get an order only if the phone number matches.
    ///
    /// A wrong phone and a missing order are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn track(&self, id: OrderId, phone: &Phone) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1 AND o.phone = $2"
        ))
        .bind(id)
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?
        .map(Order::try_from)
        .transpose()
    }

    /// Lines of an order with their product names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT i.id, i.order_id, i.product_id, p.name AS product_name, p.vendor_id,
                   i.price, i.quantity
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY i.id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect()
    }

    /// Vendors owning the lines of an order, or `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_vendors(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Vec<VendorId>>, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)")
            .bind(order_id)
            .fetch_one(self.pool)
            .await?;
        if !exists {
            return Ok(None);
        }

        let vendors: Vec<i32> = sqlx::query_scalar(
            r"
            SELECT DISTINCT p.vendor_id
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(vendors.into_iter().map(VendorId::new).collect()))
    }

    /// Order lines for a vendor's products, newest orders first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_vendor(
        &self,
        vendor_id: VendorId,
    ) -> Result<Vec<VendorOrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, VendorOrderItemRow>(&format!(
            "SELECT i.id AS item_id, i.product_id, p.name AS product_name, \
                    p.vendor_id, i.price, i.quantity, {ORDER_COLUMNS} \
             FROM order_items i \
             JOIN products p ON p.id = i.product_id \
             JOIN orders o ON o.id = i.order_id \
             WHERE p.vendor_id = $1 \
             ORDER BY o.created_at DESC, i.id"
        ))
        .bind(vendor_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(VendorOrderItem::try_from).collect()
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
