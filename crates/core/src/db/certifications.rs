//! Certification repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RepositoryError, expect_rows};
use crate::catalog::{Certification, CertificationInput};
use crate::types::{CertificationId, ImageId};

#[derive(Debug, sqlx::FromRow)]
struct CertificationRow {
    id: i32,
    name: String,
    issuing_body: String,
    description: String,
    image_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CertificationRow> for Certification {
    fn from(row: CertificationRow) -> Self {
        Self {
            id: CertificationId::new(row.id),
            name: row.name,
            issuing_body: row.issuing_body,
            description: row.description,
            image_id: row.image_id.map(ImageId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, name, issuing_body, description, image_id, created_at, updated_at";

pub struct CertificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CertificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Certification>, RepositoryError> {
        let rows = sqlx::query_as::<_, CertificationRow>(&format!(
            "SELECT {COLUMNS} FROM certification ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: CertificationId,
    ) -> Result<Option<Certification>, RepositoryError> {
        let row = sqlx::query_as::<_, CertificationRow>(&format!(
            "SELECT {COLUMNS} FROM certification WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        input: &CertificationInput,
    ) -> Result<Certification, RepositoryError> {
        let row = sqlx::query_as::<_, CertificationRow>(&format!(
            "INSERT INTO certification (name, issuing_body, description, image_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.issuing_body)
        .bind(&input.description)
        .bind(input.image_id.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the certification doesn't exist.
    pub async fn update(
        &self,
        id: CertificationId,
        input: &CertificationInput,
    ) -> Result<Certification, RepositoryError> {
        let row = sqlx::query_as::<_, CertificationRow>(&format!(
            "UPDATE certification \
             SET name = $2, issuing_body = $3, description = $4, image_id = $5, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.issuing_body)
        .bind(&input.description)
        .bind(input.image_id.map(|id| id.as_i32()))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Insert unless a certification with the same name and issuing body
    /// exists, in which case its description is refreshed. Used by seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_name(
        &self,
        input: &CertificationInput,
    ) -> Result<Certification, RepositoryError> {
        let updated = sqlx::query_as::<_, CertificationRow>(&format!(
            "UPDATE certification \
             SET description = $3, image_id = COALESCE($4, image_id), updated_at = now() \
             WHERE name = $1 AND issuing_body = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.issuing_body)
        .bind(&input.description)
        .bind(input.image_id.map(|id| id.as_i32()))
        .fetch_optional(self.pool)
        .await?;

        match updated {
            Some(row) => Ok(row.into()),
            None => self.create(input).await,
        }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the certification doesn't exist.
    pub async fn delete(&self, id: CertificationId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM certification WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certification")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
