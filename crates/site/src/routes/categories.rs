//! Category browsing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use tracing::instrument;

use kestrel_core::catalog::Category;
use kestrel_core::db::{CategoryRepository, ProductRepository};

use crate::content::render_markdown;
use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::products::ProductCard;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoryIndexTemplate {
    pub categories: Vec<Category>,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub category: Category,
    pub parent: Option<Category>,
    pub content_html: String,
    pub children: Vec<Category>,
    pub products: Vec<ProductCard>,
}

/// Top-level categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<CategoryIndexTemplate> {
    let categories = CategoryRepository::new(state.pool()).list_top_level().await?;
    Ok(CategoryIndexTemplate { categories })
}

/// Category detail: rendered content, subcategories and products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<CategoryShowTemplate> {
    let pool = state.pool();
    let categories = CategoryRepository::new(pool);

    let category = categories
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let parent = match &category.parent_category {
        Some(parent) => categories.get_by_slug(parent.as_str()).await?,
        None => None,
    };

    let products_repo = ProductRepository::new(pool);
    let (children, products) = tokio::try_join!(
        categories.list_children(category.slug.as_str()),
        products_repo.list_by_category(&category.slug),
    )?;

    Ok(CategoryShowTemplate {
        content_html: render_markdown(&category.content),
        products: products.iter().map(ProductCard::from).collect(),
        category,
        parent,
        children,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{slug}", get(show))
}
