//! Admin authentication error types.

use kestrel_core::db::RepositoryError;
use thiserror::Error;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Wrong password, unknown email, or malformed email.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The password was right but the account is not an administrator.
    #[error("this account does not have admin access")]
    NotAdmin,

    /// Argon2 failed to produce a hash.
    #[error("failed to hash password")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
