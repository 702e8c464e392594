//! Database migration command.
//!
//! Applies every file in the workspace `migrations/` directory that has not
//! run yet. The files are embedded at compile time, so the binary can be
//! shipped without them.

use thiserror::Error;

use super::MissingDatabaseUrl;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run pending migrations against `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = kestrel_core::db::create_pool(&url).await?;

    let migrator = sqlx::migrate!("../../migrations");
    tracing::info!(available = migrator.iter().count(), "Running migrations...");
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
