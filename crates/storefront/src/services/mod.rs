//! Business services that span more than one repository.

pub mod auth;

pub use auth::{AuthError, AuthService};
