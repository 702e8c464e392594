//! Blog route handlers. Only published posts are visible.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use tracing::instrument;

use kestrel_core::catalog::BlogPost;
use kestrel_core::db::BlogPostRepository;

use crate::content::render_markdown;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Post summary for listings.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    /// ISO date for `<time datetime>`.
    pub date_iso: String,
    pub reading_time_minutes: usize,
    pub image_url: Option<String>,
}

impl From<&BlogPost> for PostCard {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.to_string(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            date: post.date.format("%-d %B %Y").to_string(),
            date_iso: post.date.to_string(),
            reading_time_minutes: post.reading_time_minutes(),
            image_url: post.image_id.map(|id| format!("/images/{id}")),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub posts: Vec<PostCard>,
}

#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub post: PostCard,
    pub content_html: String,
}

/// All published posts, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<BlogIndexTemplate> {
    let posts = BlogPostRepository::new(state.pool())
        .list_published(None)
        .await?;

    Ok(BlogIndexTemplate {
        posts: posts.iter().map(PostCard::from).collect(),
    })
}

/// A single published post. Drafts are indistinguishable from missing posts.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<BlogShowTemplate> {
    let post = BlogPostRepository::new(state.pool())
        .get_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    Ok(BlogShowTemplate {
        content_html: render_markdown(&post.content),
        post: PostCard::from(&post),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{slug}", get(show))
}
