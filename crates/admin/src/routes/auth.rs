//! Authentication route handlers for admin.
//!
//! Email and password login for users flagged as administrators.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::filters;
use crate::forms::LoginForm;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

use super::render;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginPageTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Render the login page, or go straight to the dashboard when a session
/// already exists.
///
/// GET /auth/login
async fn login_page(session: Session) -> Response {
    let signed_in = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .is_some();
    if signed_in {
        return Redirect::to("/").into_response();
    }

    render(&LoginPageTemplate {
        email: String::new(),
        error: None,
    })
    .into_response()
}

/// Check credentials and start a session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email.trim()))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let err = match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(admin) => {
            set_current_admin(&session, &admin).await?;
            tracing::info!(user_id = %admin.id, "admin logged in");
            return Ok(Redirect::to("/").into_response());
        }
        Err(e) => e,
    };

    let message = err.to_string();
    let status = match err {
        AdminAuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AdminAuthError::NotAdmin => StatusCode::FORBIDDEN,
        AdminAuthError::Repository(e) => return Err(e.into()),
        AdminAuthError::PasswordHash => return Err(AppError::Internal(message)),
    };

    tracing::info!(status = %status, "admin login rejected");
    let page = LoginPageTemplate {
        email: form.email.trim().to_owned(),
        error: Some(message),
    };
    Ok((status, render(&page)).into_response())
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "failed to clear admin session");
    }
    clear_sentry_user();

    Redirect::to("/auth/login")
}
