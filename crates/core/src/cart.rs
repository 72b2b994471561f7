//! The per-visitor shopping cart.
//!
//! A [`Cart`] is a plain aggregate of `(product, quantity)` entries. It knows
//! nothing about prices; [`Cart::price`] resolves entries against whatever
//! product lookup the caller provides and computes totals from the products'
//! *current* prices. Prices are therefore not frozen until checkout.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// One cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The product in the cart.
    pub product_id: ProductId,
    /// How many units, always at least 1.
    pub quantity: u32,
}

/// A visitor's cart, in the order products were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add `quantity` units of a product, incrementing an existing entry.
    ///
    /// A quantity of zero is ignored. There is no upper bound and no stock check.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.entries.iter_mut().find(|e| e.product_id == product_id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(CartEntry {
                product_id,
                quantity,
            }),
        }
    }

    /// Remove a product entirely. Removing an absent product is a no-op.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.product_id != product_id);
        self.entries.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |acc, e| acc.saturating_add(e.quantity))
    }

    /// Quantity held for a product, if any.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.product_id == product_id)
            .map(|e| e.quantity)
    }

    /// Iterate over entries.
    pub fn entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.iter()
    }

    /// Product IDs in the cart, for a bulk lookup.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.entries.iter().map(|e| e.product_id).collect()
    }

    /// Price the cart against a product lookup.
    ///
    /// Entries whose product cannot be found are skipped, not errors: the
    /// product may have been deleted after it was added.
    pub fn price<P, F>(&self, mut lookup: F) -> PricedCart<P>
    where
        F: FnMut(ProductId) -> Option<(P, Price)>,
    {
        let lines: Vec<PricedLine<P>> = self
            .entries
            .iter()
            .filter_map(|entry| {
                lookup(entry.product_id).map(|(product, unit_price)| PricedLine {
                    product,
                    product_id: entry.product_id,
                    quantity: entry.quantity,
                    unit_price,
                    subtotal: unit_price.times(entry.quantity),
                })
            })
            .collect();

        let total = lines.iter().map(|l| l.subtotal).sum();
        PricedCart { lines, total }
    }
}

/// A cart entry resolved to a product and its current price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine<P> {
    /// Whatever the caller's lookup returned for the product.
    pub product: P,
    /// The product's ID.
    pub product_id: ProductId,
    /// Units in the cart.
    pub quantity: u32,
    /// Current unit price.
    pub unit_price: Price,
    /// `unit_price × quantity`.
    pub subtotal: Price,
}

/// A cart with totals computed from current prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart<P> {
    /// Lines for products that still exist, in cart order.
    pub lines: Vec<PricedLine<P>>,
    /// Sum of all line subtotals.
    pub total: Price,
}

impl<P> PricedCart<P> {
    /// Whether no line could be resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn pid(id: i32) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn test_add_increments_existing_entry() {
        let mut cart = Cart::new();
        cart.add(pid(1), 1);
        cart.add(pid(2), 3);
        cart.add(pid(1), 2);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of(pid(1)), Some(3));
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.product_ids(), vec![pid(1), pid(2)]);
    }

    #[test]
    fn test_add_zero_is_ignored() {
        let mut cart = Cart::new();
        cart.add(pid(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(pid(1), 1);
        assert!(!cart.remove(pid(9)));
        assert!(cart.remove(pid(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_skips_missing_products() {
        let mut cart = Cart::new();
        cart.add(pid(1), 2);
        cart.add(pid(2), 1);
        cart.add(pid(3), 5);

        let catalog: HashMap<ProductId, Price> = [
            (pid(1), Price::from_cents(10_000)),
            (pid(2), Price::from_cents(5_000)),
        ]
        .into_iter()
        .collect();

        let priced = cart.price(|id| catalog.get(&id).map(|p| (id, *p)));

        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[0].subtotal, Price::from_cents(20_000));
        assert_eq!(priced.total, Price::from_cents(25_000));
    }

    #[test]
    fn test_price_uses_current_price() {
        let mut cart = Cart::new();
        cart.add(pid(1), 2);

        let before = cart.price(|_| Some(((), Price::from_cents(100))));
        let after = cart.price(|_| Some(((), Price::from_cents(150))));

        assert_eq!(before.total, Price::from_cents(200));
        assert_eq!(after.total, Price::from_cents(300));
    }

    #[test]
    fn test_session_serialization() {
        let mut cart = Cart::new();
        cart.add(pid(4), 2);
        let json = serde_json::to_value(&cart).ok();
        let back: Option<Cart> = json.and_then(|v| serde_json::from_value(v).ok());
        assert_eq!(back, Some(cart));
    }
}
