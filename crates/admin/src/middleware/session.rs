//! Session middleware configuration for admin.
//!
//! `PostgreSQL`-backed sessions with SameSite=Strict cookies and a 24 hour
//! inactivity expiry. The table is `tower_sessions.session`, created by the
//! migrations.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "kestrel_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Schema and table holding session rows.
const SESSION_SCHEMA: &str = "tower_sessions";
const SESSION_TABLE: &str = "session";

/// Create the session layer with `PostgreSQL` store.
///
/// # Panics
///
/// Panics if the schema or table name is invalid (both are constants).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .expect("valid schema name")
        .with_table_name(SESSION_TABLE)
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
