//! Kestrel Core - shared catalog library.
//!
//! This crate provides the types and data access used by every Kestrel
//! Switchgear component:
//! - `site` - Public marketing and catalog site
//! - `admin` - Content management panel
//! - `cli` - Migrations, admin bootstrap and catalog seeding
//!
//! # Architecture
//!
//! Without features the crate contains only types and validation - no I/O.
//! The `postgres` feature adds the repository layer ([`db`]) that both
//! binaries share, so the site and the CMS always agree on the schema.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, slugs, statuses and money
//! - [`catalog`] - Catalog records and validated input types
//! - [`db`] - `PostgreSQL` repositories and keyword search (feature `postgres`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
#[cfg(feature = "postgres")]
pub mod db;
pub mod types;

pub use types::*;
