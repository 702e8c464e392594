//! `PostgreSQL` repositories shared by the site and the admin CMS.
//!
//! # Tables
//!
//! - `product`, `category`, `blog_post`, `certification` - catalog content
//! - `message` - contact form submissions
//! - `customer_order` - orders entered by the sales team
//! - `image` - uploaded image blobs
//! - `app_user` - CMS users
//!
//! # Migrations
//!
//! Migrations live in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p kestrel-cli -- migrate
//! ```

pub mod blog_posts;
pub mod categories;
pub mod certifications;
pub mod images;
pub mod messages;
pub mod orders;
pub mod products;
pub mod search;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use blog_posts::BlogPostRepository;
pub use categories::CategoryRepository;
pub use certifications::CertificationRepository;
pub use images::ImageRepository;
pub use messages::MessageRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use search::{SearchHit, SearchKind, search};
pub use users::{UserCredentials, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A computed value does not fit its column.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

impl RepositoryError {
    /// Map a unique violation to [`RepositoryError::Conflict`] with `message`.
    pub(crate) fn from_write(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Turn a stored slug back into a [`crate::Slug`].
pub(crate) fn stored_slug(raw: &str, column: &str) -> Result<crate::Slug, RepositoryError> {
    crate::Slug::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

/// Fail with [`RepositoryError::NotFound`] when nothing was touched.
pub(crate) const fn expect_rows(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    tracing::debug!("connecting to database");
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
