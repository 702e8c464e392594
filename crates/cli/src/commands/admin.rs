//! CMS administrator management commands.
//!
//! # Usage
//!
//! ```bash
//! kestrel admin create -e ops@kestrel-switchgear.com -n "Operations" -p '...'
//! kestrel admin reset-password -e ops@kestrel-switchgear.com -p '...'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use kestrel_admin::services::{AdminAuthError, hash_password};
use kestrel_core::catalog::{MIN_PASSWORD_LENGTH, UserDraft, ValidationErrors};
use kestrel_core::db::{RepositoryError, UserRepository};
use kestrel_core::{Email, UserId};
use thiserror::Error;

use super::MissingDatabaseUrl;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// One or more arguments failed validation.
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("No user with email: {0}")]
    UserNotFound(String),

    #[error("Could not hash password: {0}")]
    PasswordHash(#[from] AdminAuthError),
}

impl From<ValidationErrors> for AdminError {
    fn from(errors: ValidationErrors) -> Self {
        let detail = errors
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self::Invalid(detail)
    }
}

/// Create a new administrator.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the email is taken, or the
/// database fails.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    // Validate before touching the database
    let input = UserDraft {
        name: name.to_owned(),
        email: email.to_owned(),
        is_admin: true,
        password: password.to_owned(),
    }
    .validate(true)?;
    let password = input.password.as_deref().unwrap_or_default();
    let hash = hash_password(password)?;

    let pool = kestrel_core::db::create_pool(&super::database_url()?).await?;

    tracing::info!("Creating admin user: {}", input.email);
    let user = UserRepository::new(&pool)
        .create(&input.name, &input.email, &hash, true)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(input.email.to_string()),
            other => other.into(),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Replace the password of an existing user.
///
/// # Errors
///
/// Returns an error if the email is unknown, the password is too short, or
/// the database fails.
pub async fn reset_password(email: &str, password: &str) -> Result<(), AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::Invalid(format!("email {e}")))?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::Invalid(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let hash = hash_password(password)?;

    let pool = kestrel_core::db::create_pool(&super::database_url()?).await?;
    let users = UserRepository::new(&pool);

    let credentials = users
        .get_credentials_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_string()))?;

    users.set_password(credentials.user.id, &hash).await?;

    if !credentials.user.is_admin {
        tracing::warn!("{} is not an administrator and still cannot sign in to the CMS", email);
    }
    tracing::info!("Password updated for {}", email);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_flattened() {
        let errors = UserDraft {
            name: String::new(),
            email: "nope".to_string(),
            is_admin: true,
            password: "long-enough-password".to_string(),
        }
        .validate(true)
        .unwrap_err();

        let AdminError::Invalid(detail) = AdminError::from(errors) else {
            panic!("expected Invalid");
        };
        assert!(detail.contains("name is required"));
        assert!(detail.contains("email"));
    }

    #[tokio::test]
    async fn test_short_password_rejected_before_connecting() {
        let err = reset_password("ops@kestrel-switchgear.com", "short")
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Invalid(_)));
    }
}
