//! Account management.

use gebeya_core::Role;
use gebeya_core::validation::SignupForm;
use gebeya_storefront::services::AuthService;

use super::{CommandError, connect};

/// Arguments for `user create`.
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
}

/// Create an account with the given role.
///
/// The same validation as the signup page applies.
pub async fn create(account: NewAccount) -> Result<(), CommandError> {
    let role: Role = account.role.parse().map_err(|_| {
        CommandError::Invalid(format!(
            "Invalid role: {}. Valid roles: customer, seller, admin",
            account.role
        ))
    })?;

    let form = SignupForm {
        username: account.username,
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        password_confirm: account.password.clone(),
        password: account.password,
    };

    let pool = connect().await?;
    let user = AuthService::new(&pool).create_account(&form, role).await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    if role == Role::Seller {
        tracing::warn!("Sellers still need a vendor record: log in and visit /vendor/register/");
    }
    Ok(())
}
