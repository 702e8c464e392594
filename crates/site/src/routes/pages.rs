//! Markdown content pages: about, privacy and terms.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct ContentPageTemplate {
    pub title: String,
    pub description: String,
    pub updated_at: Option<String>,
    pub content_html: String,
}

fn serve_content_page(state: &AppState, slug: &str) -> Result<ContentPageTemplate> {
    let page = state
        .content()
        .page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page
            .meta
            .updated_at
            .map(|d| d.format("%-d %B %Y").to_string()),
        content_html: page.content_html.clone(),
    })
}

#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> Result<ContentPageTemplate> {
    serve_content_page(&state, "about")
}

#[instrument(skip(state))]
pub async fn privacy(State(state): State<AppState>) -> Result<ContentPageTemplate> {
    serve_content_page(&state, "privacy")
}

#[instrument(skip(state))]
pub async fn terms(State(state): State<AppState>) -> Result<ContentPageTemplate> {
    serve_content_page(&state, "terms")
}
