//! Outbound services used by route handlers.

pub mod notify;

pub use notify::{NotifyError, SalesNotifier};
