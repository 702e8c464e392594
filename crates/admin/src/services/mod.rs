//! Business logic that sits between routes and repositories.

pub mod auth;

pub use auth::{
    AdminAuthError, AdminAuthService, hash_password, hash_password_blocking, verify_password,
    verify_password_blocking,
};
