//! Blog post management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::instrument;

use kestrel_core::catalog::{BlogPost, BlogPostDraft, ValidationErrors};
use kestrel_core::db::BlogPostRepository;
use kestrel_core::{BlogPostId, PostStatus};

use crate::{
    error::{AppError, Result},
    filters,
    forms::BlogPostForm,
    middleware::RequireAdminAuth,
    state::AppState,
};

use super::{
    SelectOption, conflict_as_field_error, dashboard::AdminUserView, load_image_options, render,
    render_invalid,
};

/// Blog post row for the listing.
#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub date: String,
    pub status: String,
    pub is_published: bool,
    pub site_link: String,
}

#[derive(Template)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub posts: Vec<PostRow>,
}

#[derive(Template)]
#[template(path = "blog/form.html")]
pub struct BlogFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub post_id: Option<i32>,
    /// Only set for published posts.
    pub site_link: Option<String>,
    pub form: BlogPostForm,
    pub errors: ValidationErrors,
    pub statuses: Vec<SelectOption>,
    pub images: Vec<SelectOption>,
}

impl BlogFormTemplate {
    fn action(&self) -> String {
        self.post_id
            .map_or_else(|| "/blog".to_owned(), |id| format!("/blog/{id}"))
    }
}

async fn form_page(
    state: &AppState,
    admin: AdminUserView,
    post: Option<&BlogPost>,
    form: BlogPostForm,
    errors: ValidationErrors,
) -> Result<BlogFormTemplate> {
    let current_status = if form.status.is_empty() {
        PostStatus::default().as_str()
    } else {
        form.status.as_str()
    };
    let statuses = PostStatus::ALL
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), current_status))
        .collect();
    let images = load_image_options(state.pool(), &form.image_id).await?;

    Ok(BlogFormTemplate {
        admin_user: admin,
        current_path: "/blog".to_string(),
        post_id: post.map(|p| p.id.as_i32()),
        site_link: post
            .filter(|p| p.is_published())
            .map(|p| state.config().site_link(&format!("/blog/{}", p.slug))),
        form,
        errors,
        statuses,
        images,
    })
}

/// Blog posts list page handler. Drafts are listed alongside published posts.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let posts = BlogPostRepository::new(state.pool()).list_all().await?;

    let template = BlogIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/blog".to_string(),
        posts: posts
            .iter()
            .map(|p| PostRow {
                id: p.id.as_i32(),
                title: p.title.clone(),
                author: p.author.clone(),
                date: p.date.format("%Y-%m-%d").to_string(),
                status: p.status.label().to_owned(),
                is_published: p.is_published(),
                site_link: state.config().site_link(&format!("/blog/{}", p.slug)),
            })
            .collect(),
    };

    Ok(render(&template))
}

/// New post form handler. The date defaults to today.
#[instrument(skip(admin, state))]
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let form = BlogPostForm {
        date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        author: admin.name.clone(),
        ..BlogPostForm::default()
    };
    let page = form_page(
        &state,
        AdminUserView::from(&admin),
        None,
        form,
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

/// Create post handler.
#[instrument(skip(admin, state, form), fields(title = %form.title))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<BlogPostForm>,
) -> Result<Response> {
    let errors = match form.to_draft().validate(Utc::now().date_naive()) {
        Ok(input) => match BlogPostRepository::new(state.pool()).create(&input).await {
            Ok(post) => {
                tracing::info!(post_id = %post.id, status = %post.status, "Blog post created");
                return Ok(Redirect::to("/blog").into_response());
            }
            Err(e) => conflict_as_field_error(e, "slug")?,
        },
        Err(errors) => errors,
    };

    let page = form_page(&state, AdminUserView::from(&admin), None, form, errors).await?;
    Ok(render_invalid(&page))
}

/// Edit post form handler.
#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
) -> Result<Html<String>> {
    let post = find(&state, id).await?;
    let form = BlogPostForm::from(&BlogPostDraft::from(&post));

    let page = form_page(
        &state,
        AdminUserView::from(&admin),
        Some(&post),
        form,
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

/// Update post handler.
#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
    Form(form): Form<BlogPostForm>,
) -> Result<Response> {
    let post = find(&state, id).await?;

    let errors = match form.to_draft().validate(Utc::now().date_naive()) {
        Ok(input) => match BlogPostRepository::new(state.pool()).update(id, &input).await {
            Ok(updated) => {
                tracing::info!(post_id = %id, status = %updated.status, "Blog post updated");
                return Ok(Redirect::to("/blog").into_response());
            }
            Err(e) => conflict_as_field_error(e, "slug")?,
        },
        Err(errors) => errors,
    };

    let page = form_page(&state, AdminUserView::from(&admin), Some(&post), form, errors).await?;
    Ok(render_invalid(&page))
}

/// Delete post handler.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
) -> Result<Redirect> {
    BlogPostRepository::new(state.pool()).delete(id).await?;
    tracing::info!(post_id = %id, "Blog post deleted");
    Ok(Redirect::to("/blog"))
}

async fn find(state: &AppState, id: BlogPostId) -> Result<BlogPost> {
    BlogPostRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("blog post {id}")))
}
