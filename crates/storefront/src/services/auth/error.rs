//! Authentication error types.

use thiserror::Error;

use gebeya_core::ValidationErrors;

use crate::db::RepositoryError;

/// Errors that can occur during signup and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signup form failed validation.
    #[error("invalid signup: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Wrong password or unknown username.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Username or email is taken.
    #[error("a user with that username or email already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::UserAlreadyExists,
            other => Self::Repository(other),
        }
    }
}
