//! HTTP middleware stack for the public site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and sniffing protection)
//! 5. Rate limiting (governor) on the contact form and JSON API only

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::{api_rate_limiter, contact_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
