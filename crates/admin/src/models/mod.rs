//! Types kept in the admin session.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
