//! Image library handlers: listing, multipart upload, preview and delete.

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::instrument;

use kestrel_core::ImageId;
use kestrel_core::catalog::ImageUpload;
use kestrel_core::catalog::image::MAX_IMAGE_BYTES;
use kestrel_core::db::ImageRepository;

use crate::{
    error::{AppError, Result},
    filters,
    middleware::RequireAdminAuth,
    state::AppState,
};

use super::{dashboard::AdminUserView, format_timestamp, render};

/// Room for the multipart framing around the largest accepted file.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(index)
                .post(upload)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/{id}", get(show))
        .route("/{id}/delete", post(delete))
}

#[derive(Debug, Clone)]
pub struct ImageRow {
    pub id: i32,
    pub filename: String,
    pub content_type: String,
    pub size: String,
    pub uploaded: String,
}

#[derive(Template)]
#[template(path = "images/index.html")]
pub struct ImagesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub images: Vec<ImageRow>,
    pub error: Option<String>,
    pub max_size: String,
}

/// Human-readable byte count, e.g. `512 B`, `14.2 KiB`, `3.1 MiB`.
fn format_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = KIB * 1024;
    #[allow(clippy::cast_precision_loss)]
    let b = bytes as f64;
    if bytes >= MIB {
        format!("{:.1} MiB", b / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", b / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

async fn index_page(
    state: &AppState,
    admin: AdminUserView,
    error: Option<String>,
) -> Result<ImagesIndexTemplate> {
    let images = ImageRepository::new(state.pool()).list().await?;
    Ok(ImagesIndexTemplate {
        admin_user: admin,
        current_path: "/images".to_string(),
        images: images
            .iter()
            .map(|img| ImageRow {
                id: img.id.as_i32(),
                filename: img.filename.clone(),
                content_type: img.content_type.clone(),
                size: format_size(usize::try_from(img.byte_size).unwrap_or(0)),
                uploaded: format_timestamp(img.created_at),
            })
            .collect(),
        error,
        max_size: format_size(MAX_IMAGE_BYTES),
    })
}

#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let page = index_page(&state, AdminUserView::from(&admin), None).await?;
    Ok(render(&page))
}

/// Read the `file` part of the upload.
async fn read_upload(multipart: &mut Multipart) -> std::result::Result<ImageUpload, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let data = field.bytes().await.map_err(|e| e.body_text())?;
        return ImageUpload::new(&filename, &content_type, data.to_vec()).map_err(|e| e.to_string());
    }
    Err("choose a file to upload".to_string())
}

/// Upload handler. Rejected files re-render the library with the reason.
#[instrument(skip(admin, state, multipart))]
pub async fn upload(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let error = match read_upload(&mut multipart).await {
        Ok(upload) => {
            let meta = ImageRepository::new(state.pool()).create(&upload).await?;
            tracing::info!(
                image_id = %meta.id,
                filename = %meta.filename,
                bytes = meta.byte_size,
                "Image uploaded"
            );
            return Ok(Redirect::to("/images").into_response());
        }
        Err(message) => message,
    };

    tracing::info!(reason = %error, "Image upload rejected");
    let page = index_page(&state, AdminUserView::from(&admin), Some(error)).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)).into_response())
}

/// Raw bytes for previews inside the admin.
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ImageId>,
) -> Result<Response> {
    let image = ImageRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("image {id}")))?;

    let content_type = HeaderValue::from_str(&image.meta.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    Ok((
        [
            (CONTENT_TYPE, content_type),
            (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        image.data,
    )
        .into_response())
}

/// Delete handler. Records pointing at the image lose their `image_id`.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ImageId>,
) -> Result<Redirect> {
    ImageRepository::new(state.pool()).delete(id).await?;
    tracing::info!(image_id = %id, "Image deleted");
    Ok(Redirect::to("/images"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(MAX_IMAGE_BYTES), "5.0 MiB");
    }
}
