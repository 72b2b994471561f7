//! Account route handlers: signup, login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use gebeya_core::validation::SignupForm;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CurrentIdentity, clear_current_user, safe_next_path, set_current_user};
use crate::models::{CurrentUser, FlashMessage, User};
use crate::page::{PageContext, redirect_with};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub form: SignupForm,
    pub errors: Vec<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

// =============================================================================
// Forms
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: String,
}

/// Query parameters for the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(
        session,
        &CurrentUser {
            id: user.id,
            username: user.username.clone(),
        },
    )
    .await?;
    set_sentry_user(&user.id, &user.username);
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the signup page.
#[instrument(skip(session, current))]
pub async fn signup_page(session: Session, current: CurrentIdentity) -> Result<impl IntoResponse> {
    Ok(SignupTemplate {
        page: PageContext::load(&session, &current).await?,
        form: SignupForm::default(),
        errors: Vec::new(),
    })
}

/// Create a customer account and log it in.
#[instrument(skip(state, session, current, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let errors = match AuthService::new(state.pool()).signup(&form).await {
        Ok(user) => {
            start_session(&session, &user).await?;
            let message = FlashMessage::success(format!(
                "Welcome to Gebeya, {}! Your account has been created.",
                user.display_name()
            ));
            return Ok(redirect_with(&session, message, "/").await?.into_response());
        }
        Err(AuthError::Invalid(errors)) => errors.messages(),
        Err(err @ AuthError::UserAlreadyExists) => vec![err.to_string()],
        Err(AuthError::Repository(err)) => return Err(err.into()),
        Err(err @ (AuthError::InvalidCredentials | AuthError::PasswordHash)) => {
            return Err(AppError::Internal(err.to_string()));
        }
    };

    // Never echo passwords back into the form.
    let form = SignupForm {
        password: String::new(),
        password_confirm: String::new(),
        ..form
    };

    Ok(SignupTemplate {
        page: PageContext::load(&session, &current).await?,
        form,
        errors,
    }
    .into_response())
}

/// Display the login page.
#[instrument(skip(session, current))]
pub async fn login_page(
    session: Session,
    current: CurrentIdentity,
    Query(query): Query<LoginQuery>,
) -> Result<impl IntoResponse> {
    Ok(LoginTemplate {
        page: PageContext::load(&session, &current).await?,
        username: String::new(),
        next: safe_next_path(query.next.as_deref()).to_owned(),
        error: None,
    })
}

/// Log in with username and password.
#[instrument(skip(state, session, current, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    current: CurrentIdentity,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next_path(Some(&form.next)).to_owned();

    match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "user logged in");
            Ok(Redirect::to(&next).into_response())
        }
        Err(AuthError::Repository(err)) => Err(err.into()),
        Err(err) => {
            tracing::info!(reason = %err, "login failed");
            Ok(LoginTemplate {
                page: PageContext::load(&session, &current).await?,
                username: form.username,
                next,
                error: Some("Invalid username or password.".to_owned()),
            }
            .into_response())
        }
    }
}

/// Log out. The cart stays with the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    redirect_with(&session, FlashMessage::info("You have been logged out."), "/").await
}
