//! HTTP route handlers for the public site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /products                - Product list (?category=slug)
//! GET  /products/{slug}         - Product detail
//! GET  /categories              - Top-level categories
//! GET  /categories/{slug}       - Category detail
//! GET  /blog                    - Published posts
//! GET  /blog/{slug}             - Post detail
//! GET  /certifications          - Certifications
//! GET  /industries              - Industry index
//! GET  /industries/{slug}       - Industry page
//! GET  /calculators             - Calculator index
//! GET  /calculators/{name}      - Calculator form
//! POST /calculators/{name}      - Calculator result
//! GET  /search?q=               - Search page
//! GET  /contact                 - Contact form
//! POST /contact                 - Submit message (rate limited)
//! GET  /about, /privacy, /terms - Content pages
//! GET  /images/{id}             - Uploaded image bytes
//! GET  /sitemap.xml             - Sitemap
//!
//! # JSON API (rate limited)
//! GET  /api/products
//! GET  /api/search?q=
//! POST /api/calculators/{name}
//! ```

pub mod api;
pub mod blog;
pub mod calculators;
pub mod categories;
pub mod certifications;
pub mod contact;
pub mod home;
pub mod images;
pub mod industries;
pub mod pages;
pub mod products;
pub mod search;
pub mod sitemap;

use axum::{Router, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/blog", blog::router())
        .route("/certifications", get(certifications::index))
        .nest("/industries", industries::router())
        .nest("/calculators", calculators::router())
        .route("/search", get(search::page))
        .nest("/contact", contact::router())
        .route("/about", get(pages::about))
        .route("/privacy", get(pages::privacy))
        .route("/terms", get(pages::terms))
        .route("/images/{id}", get(images::show))
        .route("/sitemap.xml", get(sitemap::sitemap))
        .nest("/api", api::router())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("no route".to_owned())
}
