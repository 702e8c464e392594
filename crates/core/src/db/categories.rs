//! Category repository.
//!
//! Categories form a shallow tree through `parent_category`, which holds the
//! parent's slug. The reference is not enforced by the database; a category
//! whose parent was deleted simply stops appearing under it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RepositoryError, expect_rows, stored_slug};
use crate::catalog::{Category, CategoryInput};
use crate::types::CategoryId;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    content: String,
    keywords: Vec<String>,
    level: i32,
    parent_category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let parent_category = row
            .parent_category
            .as_deref()
            .map(|p| stored_slug(p, "parent category"))
            .transpose()?;

        Ok(Self {
            id: CategoryId::new(row.id),
            slug: stored_slug(&row.slug, "category slug")?,
            name: row.name,
            description: row.description,
            content: row.content,
            keywords: row.keywords,
            level: row.level,
            parent_category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, name, slug, description, content, keywords, level, parent_category, \
                       created_at, updated_at";

/// Repository for product categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by level, then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM category ORDER BY level, name"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Level-1 categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_top_level(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM category WHERE level = 1 ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Direct children of the category with slug `parent`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_children(&self, parent: &str) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM category WHERE parent_category = $1 ORDER BY name"
        ))
        .bind(parent)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM category WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM category WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO category \
                 (name, slug, description, content, keywords, level, parent_category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(&input.content)
        .bind(&input.keywords)
        .bind(input.level)
        .bind(input.parent_category.as_ref().map(|p| p.as_str()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a category with this slug already exists"))?;

        tracing::info!(category_id = row.id, slug = %row.slug, "category created");
        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist and
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE category \
             SET name = $2, slug = $3, description = $4, content = $5, keywords = $6, \
                 level = $7, parent_category = $8, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(&input.content)
        .bind(&input.keywords)
        .bind(input.level)
        .bind(input.parent_category.as_ref().map(|p| p.as_str()))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a category with this slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Insert or update by slug. Used by catalog seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO category \
                 (name, slug, description, content, keywords, level, parent_category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, description = EXCLUDED.description, \
                 content = EXCLUDED.content, keywords = EXCLUDED.keywords, \
                 level = EXCLUDED.level, parent_category = EXCLUDED.parent_category, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.slug.as_str())
        .bind(&input.description)
        .bind(&input.content)
        .bind(&input.keywords)
        .bind(input.level)
        .bind(input.parent_category.as_ref().map(|p| p.as_str()))
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
