//! Domain models for the marketplace.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod article;
pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use article::Article;
pub use catalog::{Category, Product, ProductImage, ProductListing, Review, Vendor};
pub use order::{Order, OrderItem, VendorOrderItem};
pub use session::{CurrentUser, FlashKind, FlashMessage, keys as session_keys};
pub use user::{NewUser, User};
