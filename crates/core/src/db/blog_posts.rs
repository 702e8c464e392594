//! Blog post repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::{RepositoryError, expect_rows, stored_slug};
use crate::catalog::{BlogPost, BlogPostInput};
use crate::types::{BlogPostId, ImageId, PostStatus};

#[derive(Debug, sqlx::FromRow)]
struct BlogPostRow {
    id: i32,
    slug: String,
    title: String,
    excerpt: String,
    content: String,
    date: NaiveDate,
    author: String,
    image_id: Option<i32>,
    status: PostStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlogPostRow> for BlogPost {
    type Error = RepositoryError;

    fn try_from(row: BlogPostRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BlogPostId::new(row.id),
            slug: stored_slug(&row.slug, "post slug")?,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            date: row.date,
            author: row.author,
            image_id: row.image_id.map(ImageId::new),
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, slug, title, excerpt, content, date, author, image_id, status, \
                       created_at, updated_at";

/// Repository for blog posts.
pub struct BlogPostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogPostRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every post including drafts, newest first (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {COLUMNS} FROM blog_post ORDER BY date DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Published posts, newest first. `None` returns all of them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {COLUMNS} FROM blog_post \
             WHERE status = 'published' \
             ORDER BY date DESC, id DESC \
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {COLUMNS} FROM blog_post WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// A published post by slug. Drafts are never returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {COLUMNS} FROM blog_post WHERE slug = $1 AND status = 'published'"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &BlogPostInput) -> Result<BlogPost, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "INSERT INTO blog_post \
                 (slug, title, excerpt, content, date, author, image_id, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        ))
        .bind(input.slug.as_str())
        .bind(&input.title)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(input.date)
        .bind(&input.author)
        .bind(input.image_id.map(|id| id.as_i32()))
        .bind(input.status)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a post with this slug already exists"))?;

        tracing::info!(post_id = row.id, status = %row.status, "blog post created");
        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist and
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: BlogPostId,
        input: &BlogPostInput,
    ) -> Result<BlogPost, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "UPDATE blog_post \
             SET slug = $2, title = $3, excerpt = $4, content = $5, date = $6, author = $7, \
                 image_id = $8, status = $9, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(input.slug.as_str())
        .bind(&input.title)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(input.date)
        .bind(&input.author)
        .bind(input.image_id.map(|id| id.as_i32()))
        .bind(input.status)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "a post with this slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    pub async fn delete(&self, id: BlogPostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_post WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }

    /// Count posts, optionally only those with `status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, status: Option<PostStatus>) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM blog_post WHERE $1::post_status IS NULL OR status = $1",
        )
        .bind(status)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}
