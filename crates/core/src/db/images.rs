//! Image blob repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RepositoryError, expect_rows};
use crate::catalog::{Image, ImageMeta, ImageUpload};
use crate::types::ImageId;

#[derive(Debug, sqlx::FromRow)]
struct ImageMetaRow {
    id: i32,
    filename: String,
    content_type: String,
    byte_size: i32,
    created_at: DateTime<Utc>,
}

impl From<ImageMetaRow> for ImageMeta {
    fn from(row: ImageMetaRow) -> Self {
        Self {
            id: ImageId::new(row.id),
            filename: row.filename,
            content_type: row.content_type,
            byte_size: row.byte_size,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    #[sqlx(flatten)]
    meta: ImageMetaRow,
    data: Vec<u8>,
}

const META_COLUMNS: &str = "id, filename, content_type, byte_size, created_at";

pub struct ImageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ImageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Metadata for every image, newest first. Blobs are not loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ImageMeta>, RepositoryError> {
        let rows = sqlx::query_as::<_, ImageMetaRow>(&format!(
            "SELECT {META_COLUMNS} FROM image ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Load an image with its bytes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ImageId) -> Result<Option<Image>, RepositoryError> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {META_COLUMNS}, data FROM image WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|row| Image {
            meta: row.meta.into(),
            data: row.data,
        }))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the upload is larger than
    /// a Postgres `INTEGER` can describe, or `RepositoryError::Database`.
    pub async fn create(&self, upload: &ImageUpload) -> Result<ImageMeta, RepositoryError> {
        let byte_size = i32::try_from(upload.data.len())
            .map_err(|_| RepositoryError::DataCorruption("image too large".to_owned()))?;

        let row = sqlx::query_as::<_, ImageMetaRow>(&format!(
            "INSERT INTO image (filename, content_type, data, byte_size) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {META_COLUMNS}"
        ))
        .bind(&upload.filename)
        .bind(&upload.content_type)
        .bind(&upload.data)
        .bind(byte_size)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(image_id = row.id, byte_size, "image stored");
        Ok(row.into())
    }

    /// Delete an image. References from products, posts and certifications
    /// are cleared by the `ON DELETE SET NULL` foreign keys.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image doesn't exist.
    pub async fn delete(&self, id: ImageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM image WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }
}
