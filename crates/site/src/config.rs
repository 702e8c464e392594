//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_BASE_URL` - Public URL used in the sitemap and canonical links
//!   (default: `http://localhost:3000`)
//! - `SITE_CONTENT_DIR` - Markdown pages and industries (default: `crates/site/content`)
//! - `SITE_STATIC_DIR` - CSS and other static files (default: `crates/site/static`)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` -
//!   outgoing mail for contact notifications; all required once `SMTP_HOST` is set
//! - `SALES_EMAIL` - Recipient of contact notifications (required with SMTP)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Admin CMS base URL, linked from notification emails
    pub admin_url: String,
    pub content_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Outgoing mail for contact notifications
    pub smtp: Option<SmtpConfig>,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// SMTP settings for contact notifications.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Sender address (From header)
    pub from_address: String,
    /// Where new contact messages are announced
    pub sales_email: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("sales_email", &self.sales_email)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SITE_DATABASE_URL")?;
        let host = parse_env("SITE_HOST", "127.0.0.1")?;
        let port = parse_env("SITE_PORT", "3000")?;
        let base_url = get_env_or_default("SITE_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_owned();
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_BASE_URL".to_owned(), e.to_string()))?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            admin_url: get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001")
                .trim_end_matches('/')
                .to_owned(),
            content_dir: get_env_or_default("SITE_CONTENT_DIR", "crates/site/content").into(),
            static_dir: get_env_or_default("SITE_STATIC_DIR", "crates/site/static").into(),
            smtp: SmtpConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL for a site path such as `/products`.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl SmtpConfig {
    /// `None` when `SMTP_HOST` is unset; notifications are then skipped.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            host,
            port: parse_env("SMTP_PORT", "587")?,
            username: get_required_env("SMTP_USERNAME")?,
            password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("SMTP_FROM")?,
            sales_email: get_required_env("SALES_EMAIL")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> SiteConfig {
        SiteConfig {
            database_url: SecretString::from("postgres://localhost/kestrel"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://www.kestrel-switchgear.com".to_string(),
            admin_url: "https://admin.kestrel-switchgear.com".to_string(),
            content_dir: PathBuf::from("content"),
            static_dir: PathBuf::from("static"),
            smtp: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            config().absolute_url("/products/kx-12"),
            "https://www.kestrel-switchgear.com/products/kx-12"
        );
    }

    #[test]
    fn test_smtp_debug_redacts_password() {
        let smtp = SmtpConfig {
            host: "smtp.mailhost.net".to_string(),
            port: 587,
            username: "web".to_string(),
            password: SecretString::from("hunter2-but-longer"),
            from_address: "web@kestrel-switchgear.com".to_string(),
            sales_email: "sales@kestrel-switchgear.com".to_string(),
        };
        let debug_output = format!("{smtp:?}");
        assert!(debug_output.contains("smtp.mailhost.net"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_parse_env_uses_default() {
        let port: u16 = parse_env("KESTREL_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);
    }
}
