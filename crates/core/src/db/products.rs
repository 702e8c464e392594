//! Product repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::{RepositoryError, expect_rows, stored_slug};
use crate::catalog::{Product, ProductInput, ProductSpec};
use crate::types::{ImageId, ProductId, Slug};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    title: String,
    slug: String,
    description: String,
    specs: Json<Vec<ProductSpec>>,
    applications: Vec<String>,
    image_id: Option<i32>,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            slug: stored_slug(&row.slug, "product slug")?,
            category: stored_slug(&row.category, "product category")?,
            title: row.title,
            description: row.description,
            specs: row.specs.0,
            applications: row.applications,
            image_id: row.image_id.map(ImageId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, title, slug, description, specs, applications, image_id, category, \
                       created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM product ORDER BY title"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Most recently added products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_latest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM product ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Products listed under one category slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(&self, category: &Slug) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM product WHERE category = $1 ORDER BY title"
        ))
        .bind(category.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM product WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product \
                 (title, slug, description, specs, applications, image_id, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.title)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(Json(&input.specs))
        .bind(&input.applications)
        .bind(input.image_id.map(|id| id.as_i32()))
        .bind(input.category.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a product with this slug already exists"))?;

        tracing::info!(product_id = row.id, slug = %row.slug, "product created");
        row.try_into()
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist and
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE product \
             SET title = $2, slug = $3, description = $4, specs = $5, applications = $6, \
                 image_id = $7, category = $8, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&input.title)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(Json(&input.specs))
        .bind(&input.applications)
        .bind(input.image_id.map(|id| id.as_i32()))
        .bind(input.category.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a product with this slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Insert or update by slug. Used by catalog seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product \
                 (title, slug, description, specs, applications, image_id, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (slug) DO UPDATE SET \
                 title = EXCLUDED.title, description = EXCLUDED.description, \
                 specs = EXCLUDED.specs, applications = EXCLUDED.applications, \
                 image_id = COALESCE(EXCLUDED.image_id, product.image_id), \
                 category = EXCLUDED.category, updated_at = now() \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.title)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(Json(&input.specs))
        .bind(&input.applications)
        .bind(input.image_id.map(|id| id.as_i32()))
        .bind(input.category.as_str())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
