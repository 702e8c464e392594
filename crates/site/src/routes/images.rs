//! Uploaded image bytes.
//!
//! Images never change once stored (a new upload gets a new ID), so
//! responses are cached for a year and kept in an in-process moka cache.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{
        HeaderValue,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
    },
    response::{IntoResponse, Response},
};
use tracing::instrument;

use kestrel_core::ImageId;
use kestrel_core::catalog::Image;
use kestrel_core::db::ImageRepository;

use crate::error::{AppError, Result};
use crate::state::AppState;

pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Build the response for stored image bytes.
#[must_use]
pub fn image_response(image: &Image) -> Response {
    let content_type = HeaderValue::from_str(&image.meta.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    let mut response = image.data.clone().into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(image.data.len()));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// `GET /images/{id}`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Response> {
    let id = ImageId::new(id);

    if let Some(image) = state.image_cache().get(&id).await {
        return Ok(image_response(&image));
    }

    let image = ImageRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("image {id}")))?;

    let image = Arc::new(image);
    state.image_cache().insert(id, Arc::clone(&image)).await;
    Ok(image_response(&image))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kestrel_core::catalog::ImageMeta;

    #[test]
    fn test_image_response_headers() {
        let image = Image {
            meta: ImageMeta {
                id: ImageId::new(3),
                filename: "rmu.png".to_string(),
                content_type: "image/png".to_string(),
                byte_size: 4,
                created_at: chrono::Utc::now(),
            },
            data: vec![0x89, b'P', b'N', b'G'],
        };
        let response = image_response(&image);
        let headers = response.headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(headers.get(CONTENT_LENGTH).unwrap(), "4");
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), IMMUTABLE_CACHE_CONTROL);
    }
}
