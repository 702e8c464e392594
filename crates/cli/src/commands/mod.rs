//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// `DATABASE_URL` is not set.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: DATABASE_URL")]
pub struct MissingDatabaseUrl;

/// Read `DATABASE_URL`.
///
/// # Errors
///
/// Returns [`MissingDatabaseUrl`] when the variable is unset or empty.
pub fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    std::env::var("DATABASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or(MissingDatabaseUrl)
}
