//! Admin authentication service.
//!
//! Email and password login against Argon2id hashes stored on `app_user`.
//! Only users flagged `is_admin` may sign in to the CMS.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use kestrel_core::db::{RepositoryError, UserRepository};
use kestrel_core::{Email, UserId};

use crate::models::CurrentAdmin;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Check an email and password and return the identity to keep in the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for a malformed or
    /// unknown email or a wrong password, `AdminAuthError::NotAdmin` when the
    /// user exists but lacks admin rights, and `AdminAuthError::Repository`
    /// on database failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentAdmin, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let credentials = self
            .users
            .get_credentials_by_email(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password_blocking(password, &credentials.password_hash).await?;

        if !credentials.user.is_admin {
            tracing::warn!(user_id = %credentials.user.id, "non-admin login attempt");
            return Err(AdminAuthError::NotAdmin);
        }

        Ok(CurrentAdmin::from(&credentials.user))
    }

    /// Reload a signed-in user. `None` once the account is deleted or no
    /// longer flagged `is_admin`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on database failure.
    pub async fn current_admin(&self, id: UserId) -> Result<Option<CurrentAdmin>, RepositoryError> {
        Ok(self
            .users
            .get_by_id(id)
            .await?
            .filter(|user| user.is_admin)
            .map(|user| CurrentAdmin::from(&user)))
    }
}

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// [`hash_password`] on the blocking thread pool, for use in handlers.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails or the task is
/// cancelled.
pub async fn hash_password_blocking(password: &str) -> Result<String, AdminAuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| AdminAuthError::PasswordHash)?
}

/// [`verify_password`] on the blocking thread pool.
///
/// # Errors
///
/// As [`verify_password`], or `AdminAuthError::PasswordHash` if the task is
/// cancelled.
pub async fn verify_password_blocking(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|_| AdminAuthError::PasswordHash)?
}

/// Verify a password against a PHC-format hash.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidCredentials` when the hash is malformed
/// or the password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("switchgear-42").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("switchgear-42", &hash).is_ok());
        assert!(matches!(
            verify_password("switchgear-43", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("same-password").unwrap(),
            hash_password("same-password").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_blocking_wrappers_round_trip() {
        let hash = hash_password_blocking("switchgear-42").await.unwrap();
        assert!(verify_password_blocking("switchgear-42", &hash).await.is_ok());
        assert!(matches!(
            verify_password_blocking("switchgear-43", &hash).await,
            Err(AdminAuthError::InvalidCredentials)
        ));
    }
}
