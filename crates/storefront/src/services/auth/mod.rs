//! Authentication service.
//!
//! Username and password accounts. Passwords are stored as Argon2id PHC
//! strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use gebeya_core::Role;
use gebeya_core::validation::{SignupForm, validate_signup};

use crate::db::UserRepository;
use crate::models::{NewUser, User};

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a customer account from a submitted signup form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` with every form violation.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    /// Returns `AuthError::Repository` for database errors.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, AuthError> {
        let user = self.create_account(form, Role::Customer).await?;
        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    /// Create an account with an explicit role. Used by the CLI for vendor
    /// and admin accounts.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::signup`].
    pub async fn create_account(&self, form: &SignupForm, role: Role) -> Result<User, AuthError> {
        let input = validate_signup(form)?;
        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(&NewUser {
                username: input.username,
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
                role,
            })
            .await?;

        Ok(user)
    }

    /// Check a username and password.
    ///
    /// Unknown users and wrong passwords are indistinguishable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the pair does not match.
    /// Returns `AuthError::Repository` for database errors.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some((user, password_hash)) = self.users.get_credentials(username.trim()).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;
        Ok(user)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("jimma-coffee-2026").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("jimma-coffee-2026", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
