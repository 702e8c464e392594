//! Industry pages served from markdown in `content/industries`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use tracing::instrument;

use kestrel_core::catalog::Category;
use kestrel_core::db::CategoryRepository;

use crate::content::Industry;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "industries/index.html")]
pub struct IndustryIndexTemplate {
    pub industries: Vec<Industry>,
}

#[derive(Template, WebTemplate)]
#[template(path = "industries/show.html")]
pub struct IndustryShowTemplate {
    pub industry: Industry,
    /// Product categories the page links to. Slugs in the front matter
    /// that no longer exist are skipped.
    pub categories: Vec<Category>,
}

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> IndustryIndexTemplate {
    IndustryIndexTemplate {
        industries: state.content().industries().to_vec(),
    }
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<IndustryShowTemplate> {
    let industry = state
        .content()
        .industry(&slug)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("industry {slug}")))?;

    let repo = CategoryRepository::new(state.pool());
    let mut categories = Vec::with_capacity(industry.meta.categories.len());
    for category_slug in &industry.meta.categories {
        match repo.get_by_slug(category_slug).await? {
            Some(category) => categories.push(category),
            None => tracing::warn!(
                industry = %industry.slug,
                category = %category_slug,
                "industry page references a missing category"
            ),
        }
    }

    Ok(IndustryShowTemplate {
        industry,
        categories,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{slug}", get(show))
}
