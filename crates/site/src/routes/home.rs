//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use kestrel_core::catalog::Category;
use kestrel_core::db::{BlogPostRepository, CategoryRepository, ProductRepository};

use crate::error::Result;
use crate::filters;
use crate::routes::blog::PostCard;
use crate::routes::products::ProductCard;
use crate::state::AppState;

const LATEST_PRODUCTS: i64 = 6;
const LATEST_POSTS: i64 = 3;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<Category>,
    pub products: Vec<ProductCard>,
    pub posts: Vec<PostCard>,
}

/// Display the home page: top-level categories, newest products and posts.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<HomeTemplate> {
    let pool = state.pool();
    let categories_repo = CategoryRepository::new(pool);
    let products_repo = ProductRepository::new(pool);
    let posts_repo = BlogPostRepository::new(pool);
    let (categories, products, posts) = tokio::try_join!(
        categories_repo.list_top_level(),
        products_repo.list_latest(LATEST_PRODUCTS),
        posts_repo.list_published(Some(LATEST_POSTS)),
    )?;

    Ok(HomeTemplate {
        categories,
        products: products.iter().map(ProductCard::from).collect(),
        posts: posts.iter().map(PostCard::from).collect(),
    })
}
