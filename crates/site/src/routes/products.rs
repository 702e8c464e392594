//! Product catalog pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use kestrel_core::Slug;
use kestrel_core::catalog::{Category, Product, ProductSpec};
use kestrel_core::db::{CategoryRepository, ProductRepository};

use crate::content::render_markdown;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// How many related products the detail page shows.
const RELATED_PRODUCTS: usize = 4;

/// Product summary for grids.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            slug: product.slug.to_string(),
            summary: summarize(&product.description, 160),
            image_url: product.image_id.map(|id| format!("/images/{id}")),
        }
    }
}

/// First paragraph of `text`, cut at a word boundary near `max` characters.
#[must_use]
pub fn summarize(text: &str, max: usize) -> String {
    let first = text.split("\n\n").next().unwrap_or_default().trim();
    if first.chars().count() <= max {
        return first.to_owned();
    }
    let cut: String = first.chars().take(max).collect();
    let trimmed = cut.rsplit_once(' ').map_or(cut.as_str(), |(head, _)| head);
    format!("{}…", trimmed.trim_end_matches([',', '.', ';', ':']))
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductIndexTemplate {
    pub products: Vec<ProductCard>,
    pub categories: Vec<Category>,
    /// Category the list is filtered by, if any.
    pub selected: Option<Category>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub title: String,
    pub slug: String,
    pub description_html: String,
    pub image_url: Option<String>,
    pub specs: Vec<ProductSpec>,
    pub applications: Vec<String>,
    pub category: Option<Category>,
    pub related: Vec<ProductCard>,
}

/// List products, optionally filtered by `?category=slug`.
///
/// An unknown or malformed category slug is a 404 rather than an empty
/// list so stale links are noticed.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<ProductIndexTemplate> {
    let pool = state.pool();
    let categories = CategoryRepository::new(pool).list().await?;

    let selected = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let slug = Slug::parse(raw)
                .map_err(|_| AppError::NotFound(format!("category {raw}")))?;
            let category = categories
                .iter()
                .find(|c| c.slug == slug)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("category {raw}")))?;
            Some(category)
        }
    };

    let products = match &selected {
        Some(category) => {
            ProductRepository::new(pool)
                .list_by_category(&category.slug)
                .await?
        }
        None => ProductRepository::new(pool).list().await?,
    };

    Ok(ProductIndexTemplate {
        products: products.iter().map(ProductCard::from).collect(),
        categories,
        selected,
    })
}

/// Product detail with specs, applications and related products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let pool = state.pool();
    let product = ProductRepository::new(pool)
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let categories_repo = CategoryRepository::new(pool);
    let products_repo = ProductRepository::new(pool);
    let (category, siblings) = tokio::try_join!(
        categories_repo.get_by_slug(product.category.as_str()),
        products_repo.list_by_category(&product.category),
    )?;

    let related = siblings
        .iter()
        .filter(|p| p.id != product.id)
        .take(RELATED_PRODUCTS)
        .map(ProductCard::from)
        .collect();

    Ok(ProductShowTemplate {
        title: product.title,
        slug: product.slug.to_string(),
        description_html: render_markdown(&product.description),
        image_url: product.image_id.map(|id| format!("/images/{id}")),
        specs: product.specs,
        applications: product.applications,
        category,
        related,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{slug}", get(show))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_short_text_unchanged() {
        assert_eq!(summarize("Compact RMU.\n\nMore detail.", 80), "Compact RMU.");
    }

    #[test]
    fn test_summarize_cuts_at_word() {
        let text = "Air insulated switchgear for primary distribution, rated to 40.5 kV";
        let out = summarize(text, 30);
        assert_eq!(out, "Air insulated switchgear for…");
        assert!(out.chars().count() <= 31);
    }
}
