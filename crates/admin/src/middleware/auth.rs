//! Authentication extractor and session helpers for admin.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use kestrel_core::db::RepositoryError;
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Extractor that requires admin authentication.
///
/// The session only names the user; every request reloads the account, so
/// a user who was deleted or lost `is_admin` is signed out on their next
/// request. Without a valid admin this redirects HTML requests to the login
/// page and answers 401 for API requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests, or no session layer).
    Unauthorized,
    /// The account could not be reloaded.
    Database(RepositoryError),
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Database(e) => AppError::Database(e).into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let is_api = parts.uri.path().starts_with("/api/");
        let signed_out = move || {
            if is_api {
                AdminAuthRejection::Unauthorized
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        };

        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let stored: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(signed_out)?;

        let state = AppState::from_ref(state);
        let Some(admin) = AdminAuthService::new(state.pool())
            .current_admin(stored.id)
            .await
            .map_err(AdminAuthRejection::Database)?
        else {
            tracing::warn!(user_id = %stored.id, "session user is no longer an admin, signing out");
            if let Err(e) = clear_current_admin(&session).await {
                tracing::warn!(error = %e, "failed to clear admin session");
            }
            return Err(signed_out());
        };

        // Name or email edited since login
        if admin != stored
            && let Err(e) = session.insert(session_keys::CURRENT_ADMIN, &admin).await
        {
            tracing::warn!(error = %e, "failed to refresh admin session");
        }

        set_sentry_user(admin.id.as_i32(), Some(admin.email.as_str()));

        Ok(Self(admin))
    }
}

/// Store the logged-in admin in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Clear the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    session.flush().await
}
