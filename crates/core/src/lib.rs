//! Gebeya Core - Marketplace domain types and rules.
//!
//! This crate provides the types and business rules shared by all Gebeya components:
//! - `storefront` - Public marketplace site and vendor dashboard
//! - `cli` - Command-line tools for migrations, seeding and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Callers load data, hand it to these functions, and persist
//! whatever comes back.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, slugs, ratings, contact data and enums
//! - [`cart`] - The per-visitor cart aggregate and its pricing
//! - [`checkout`] - Turning a priced cart into an order draft with price snapshots
//! - [`review`] - Rating aggregation
//! - [`identity`] - Request identity and vendor authorization rules
//! - [`validation`] - Form input validation with enumerated violations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod identity;
pub mod review;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartEntry, PricedCart, PricedLine};
pub use checkout::{CheckoutError, ContactDetails, OrderDraft, OrderLineDraft};
pub use identity::{AuthorizationError, Identity};
pub use review::RatingSummary;
pub use types::*;
pub use validation::{ValidationError, ValidationErrors};
