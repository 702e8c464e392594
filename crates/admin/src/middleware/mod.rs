//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, request context)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fills the span field and the response header)
//! 4. Security headers (no caching, no framing)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is not a layer: protected handlers take a
//! [`RequireAdminAuth`] extractor.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, set_current_admin};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
