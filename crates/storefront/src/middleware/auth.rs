//! Authentication extractors.
//!
//! The session stores only the logged-in user's ID and name. Role and vendor
//! status are looked up on every request and folded into an [`Identity`],
//! so a vendor registration or role change takes effect immediately.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use gebeya_core::{Identity, VendorId};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, FlashMessage, session_keys};
use crate::page::push_flash;
use crate::state::AppState;

/// The identity of the requester, resolved from session and database.
///
/// Never rejects: visitors without a session user are [`Identity::Guest`].
#[derive(Debug, Clone)]
pub struct CurrentIdentity {
    pub user: Option<CurrentUser>,
    pub identity: Identity,
}

impl CurrentIdentity {
    const GUEST: Self = Self {
        user: None,
        identity: Identity::Guest,
    };
}

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self::GUEST);
        };

        let Some(user) = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?
        else {
            return Ok(Self::GUEST);
        };

        // Account deleted since login: drop the stale session user.
        let Some((role, vendor_id)) = UserRepository::new(state.pool())
            .identity_facts(user.id)
            .await?
        else {
            tracing::info!(user_id = %user.id, "session user no longer exists");
            session
                .remove::<CurrentUser>(session_keys::CURRENT_USER)
                .await?;
            return Ok(Self::GUEST);
        };

        let identity = Identity::resolve(Some((user.id, role)), vendor_id);
        Ok(Self {
            user: Some(user),
            identity,
        })
    }
}

/// Extractor that requires a logged-in user.
///
/// Unauthenticated visitors are redirected to the login page with the
/// requested path as `next`.
#[derive(Debug, Clone)]
pub struct RequireUser {
    pub user: CurrentUser,
    pub identity: Identity,
}

/// Where logged-in users without a vendor record are sent.
pub const VENDOR_REGISTRATION_PATH: &str = "/vendor/register/";

/// Rejection for [`RequireUser`] and [`RequireVendor`].
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin(String),
    /// Redirect a non-vendor to vendor registration.
    RedirectToRegistration,
    /// Identity lookup failed.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => {
                Redirect::to(&format!("/login/?next={}", urlencoding::encode(&next)))
                    .into_response()
            }
            Self::RedirectToRegistration => {
                Redirect::to(VENDOR_REGISTRATION_PATH).into_response()
            }
            Self::Failed(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentIdentity::from_request_parts(parts, state)
            .await
            .map_err(AuthRejection::Failed)?;

        match current.user {
            Some(user) => Ok(Self {
                user,
                identity: current.identity,
            }),
            None => Err(AuthRejection::RedirectToLogin(parts.uri.path().to_owned())),
        }
    }
}

/// Extractor that requires a logged-in user with a vendor record.
///
/// Guests go to the login page; other users go to vendor registration with
/// a message.
#[derive(Debug, Clone)]
pub struct RequireVendor {
    pub user: CurrentUser,
    pub vendor_id: VendorId,
    pub identity: Identity,
}

impl FromRequestParts<AppState> for RequireVendor {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser { user, identity } = RequireUser::from_request_parts(parts, state).await?;

        match identity.require_vendor() {
            Ok(vendor_id) => Ok(Self {
                user,
                vendor_id,
                identity,
            }),
            Err(err) => {
                if let Some(session) = parts.extensions.get::<Session>() {
                    push_flash(session, FlashMessage::info(format!("{}.", capitalize(&err.to_string()))))
                        .await
                        .map_err(|e| AuthRejection::Failed(e.into()))?;
                }
                Err(AuthRejection::RedirectToRegistration)
            }
        }
    }
}

/// Upper-case the first letter of a message.
#[must_use]
pub fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Store the logged-in user in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the logged-in user from the session (logout).
///
/// The cart stays with the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

/// Only accept local paths as post-login redirect targets.
///
/// Browsers read a leading `/\` like `//`, so both are rejected.
#[must_use]
pub fn safe_next_path(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(
            capitalize("you must register as a vendor first"),
            "You must register as a vendor first"
        );
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_safe_next_path() {
        assert_eq!(safe_next_path(Some("/vendor/dashboard/")), "/vendor/dashboard/");
        assert_eq!(safe_next_path(Some("//evil.example")), "/");
        assert_eq!(safe_next_path(Some("https://evil.example")), "/");
        assert_eq!(safe_next_path(Some("/\\evil.example")), "/");
        assert_eq!(safe_next_path(Some("/\tevil.example")), "/");
        assert_eq!(safe_next_path(Some("/products/\n")), "/");
        assert_eq!(safe_next_path(None), "/");
    }
}
