//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready       - Liveness and database readiness
//!
//! GET  /auth/login                  - Login form
//! POST /auth/login                  - Check email + password
//! POST /auth/logout                 - Clear the session
//!
//! GET  /                            - Dashboard
//!
//! # Products, blog, categories, certifications, users
//! GET  /{kind}                      - Listing
//! GET  /{kind}/new                  - Create form
//! POST /{kind}                      - Create
//! GET  /{kind}/{id}/edit            - Edit form
//! POST /{kind}/{id}                 - Update
//! POST /{kind}/{id}/delete          - Delete
//!
//! # Orders
//! GET  /orders                      - Listing (?status= filter)
//! GET  /orders/new, POST /orders    - Create
//! GET  /orders/{id}                 - Detail + edit form
//! POST /orders/{id}                 - Update
//! POST /orders/{id}/status          - Change status only
//! POST /orders/{id}/delete          - Delete
//!
//! # Messages
//! GET  /messages                    - Inbox
//! GET  /messages/{id}               - Read (marks as read)
//! POST /messages/{id}/delete        - Delete
//!
//! # Images
//! GET  /images                      - Library + upload form
//! POST /images                      - Multipart upload
//! GET  /images/{id}                 - Raw bytes for previews
//! POST /images/{id}/delete          - Delete
//! ```
//!
//! Every handler except login and health takes [`RequireAdminAuth`].
//!
//! [`RequireAdminAuth`]: crate::middleware::RequireAdminAuth

pub mod auth;
pub mod blog;
pub mod categories;
pub mod certifications;
pub mod dashboard;
pub mod images;
pub mod messages;
pub mod orders;
pub mod products;
pub mod users;

use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};

use kestrel_core::catalog::{ImageMeta, ValidationErrors};
use kestrel_core::db::{ImageRepository, RepositoryError};
use sqlx::PgPool;

use crate::error::AppError;
use crate::forms::single_error;
use crate::state::AppState;

/// The six routes shared by every plain CRUD section.
macro_rules! crud_routes {
    ($module:ident) => {
        Router::new()
            .route("/", get($module::index).post($module::create))
            .route("/new", get($module::new))
            .route("/{id}", post($module::update))
            .route("/{id}/edit", get($module::edit))
            .route("/{id}/delete", post($module::delete))
    };
}

/// Build the admin router (without middleware).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .merge(auth::router())
        .nest("/products", crud_routes!(products))
        .nest("/blog", crud_routes!(blog))
        .nest("/categories", crud_routes!(categories))
        .nest("/certifications", crud_routes!(certifications))
        .nest("/users", crud_routes!(users))
        .nest("/orders", orders::router())
        .nest("/messages", messages::router())
        .nest("/images", images::router())
}

/// Render a template to HTML, logging render failures.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Re-render a form that failed validation.
pub(crate) fn render_invalid<T: Template>(template: &T) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, render(template)).into_response()
}

/// Turn a uniqueness conflict into a form error on `field`; any other
/// repository failure stays an [`AppError`].
pub(crate) fn conflict_as_field_error(
    err: RepositoryError,
    field: &'static str,
) -> Result<ValidationErrors, AppError> {
    match err {
        RepositoryError::Conflict(message) => Ok(single_error(field, message)),
        other => Err(other.into()),
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        Self {
            selected: value == current.trim(),
            label: label.into(),
            value,
        }
    }
}

/// Image picker options, led by a "no image" entry.
pub(crate) fn image_options(images: &[ImageMeta], current: &str) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", "(no image)", current))
        .chain(
            images
                .iter()
                .map(|img| SelectOption::new(img.id.to_string(), &img.filename, current)),
        )
        .collect()
}

/// Load the image library for a picker.
pub(crate) async fn load_image_options(
    pool: &PgPool,
    current: &str,
) -> Result<Vec<SelectOption>, AppError> {
    let images = ImageRepository::new(pool).list().await?;
    Ok(image_options(&images, current))
}

/// Timestamp as shown in tables, e.g. `2026-03-01 14:05`.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use kestrel_core::ImageId;

    fn meta(id: i32, filename: &str) -> ImageMeta {
        ImageMeta {
            id: ImageId::new(id),
            filename: filename.to_string(),
            content_type: "image/png".to_string(),
            byte_size: 10,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_image_options_mark_current() {
        let options = image_options(&[meta(3, "rmu.png"), meta(4, "vcb.png")], "4");
        assert_eq!(options.len(), 3);
        assert!(!options[0].selected);
        assert_eq!(options[2].label, "vcb.png");
        assert!(options[2].selected);
    }

    #[test]
    fn test_no_image_selected_by_default() {
        let options = image_options(&[meta(3, "rmu.png")], "");
        assert!(options[0].selected);
        assert!(!options[1].selected);
    }

    #[test]
    fn test_conflict_becomes_field_error() {
        let errors =
            conflict_as_field_error(RepositoryError::Conflict("slug already exists".into()), "slug")
                .unwrap();
        assert_eq!(errors.get("slug"), Some("slug already exists"));
        assert!(conflict_as_field_error(RepositoryError::NotFound, "slug").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        let ts = DateTime::parse_from_rfc3339("2026-03-01T14:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(ts), "2026-03-01 14:05");
    }
}
