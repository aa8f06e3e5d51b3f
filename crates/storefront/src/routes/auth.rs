//! Authentication route handlers.
//!
//! Sign-in and sign-up go to the identity provider; the resulting user is
//! kept in the session. Both pages send an already signed-in visitor back
//! to the home page.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthClient, AuthError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
///
/// Name and phone are collected by the page but not sent to the provider.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// What the sign-in and sign-up pages need to render.
#[derive(Debug, Serialize)]
pub struct AuthPage {
    pub page: &'static str,
    /// False when no identity provider is configured.
    pub enabled: bool,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the sign-in page.
pub async fn signin_page(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    Json(AuthPage {
        page: "signin",
        enabled: state.auth().is_some(),
    })
    .into_response()
}

/// Handle sign-in form submission.
#[instrument(skip(state, session, user, form))]
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<SignInForm>,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let user = provider(&state)?.sign_in(&form.email, &form.password).await?;
    remember(&session, &user).await?;

    Ok(Redirect::to("/").into_response())
}

/// Display the sign-up page.
pub async fn signup_page(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    Json(AuthPage {
        page: "signup",
        enabled: state.auth().is_some(),
    })
    .into_response()
}

/// Handle sign-up form submission.
#[instrument(skip(state, session, user, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<SignUpForm>,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if form.password != form.password_confirm {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    let user = provider(&state)?.sign_up(&form.email, &form.password).await?;
    remember(&session, &user).await?;

    Ok(Redirect::to("/").into_response())
}

/// Sign out and go home. The cart is kept.
#[instrument(skip(session))]
pub async fn signout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    tracing::info!("User signed out");
    Ok(Redirect::to("/"))
}

fn provider(state: &AppState) -> std::result::Result<&AuthClient, AuthError> {
    state.auth().ok_or(AuthError::NotConfigured)
}

async fn remember(session: &Session, user: &CurrentUser) -> Result<()> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.uid, Some(user.email.as_str()));
    Ok(())
}
