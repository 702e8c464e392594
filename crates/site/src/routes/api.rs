//! JSON API: products and search.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use kestrel_core::catalog::{Product, ProductSpec};
use kestrel_core::db::ProductRepository;

use crate::error::Result;
use crate::middleware::api_rate_limiter;
use crate::routes::{calculators, search};
use crate::state::AppState;

/// Public product representation.
#[derive(Debug, Serialize)]
pub struct ProductJson {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub specs: Vec<ProductSpec>,
    pub applications: Vec<String>,
    pub image_url: Option<String>,
    pub url: String,
}

impl ProductJson {
    fn new(product: Product, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            url: format!("{base}/products/{}", product.slug),
            image_url: product.image_id.map(|id| format!("{base}/images/{id}")),
            title: product.title,
            slug: product.slug.into(),
            description: product.description,
            category: product.category.into(),
            specs: product.specs,
            applications: product.applications,
        }
    }
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn products(State(state): State<AppState>) -> Result<Json<Vec<ProductJson>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    let base_url = &state.config().base_url;
    Ok(Json(
        products
            .into_iter()
            .map(|p| ProductJson::new(p, base_url))
            .collect(),
    ))
}

/// Routes mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(products))
        .route("/search", get(search::api))
        .layer(api_rate_limiter())
        .nest("/calculators", calculators::api_router())
}
