//! Core types for Gebeya.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod price;
pub mod rating;
pub mod slug;
pub mod status;

pub use contact::{Email, EmailError, Phone, PhoneError};
pub use id::*;
pub use price::Price;
pub use rating::{Rating, RatingError};
pub use slug::Slug;
pub use status::*;
