//! Contact-form message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RepositoryError, expect_rows};
use crate::catalog::{Message, MessageInput};
use crate::types::{Email, MessageId, MessageKind};

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    kind: MessageKind,
    subject: String,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: MessageId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            kind: row.kind,
            subject: row.subject,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str = "id, name, email, phone, kind, subject, message, is_read, created_at";

pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All messages, unread first, then newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {COLUMNS} FROM message ORDER BY is_read, created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {COLUMNS} FROM message WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Store a submission from the public contact form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &MessageInput) -> Result<Message, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "INSERT INTO message (name, email, phone, kind, subject, message) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.email.as_str())
        .bind(input.phone.as_deref())
        .bind(input.kind)
        .bind(&input.subject)
        .bind(&input.message)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(message_id = row.id, kind = %row.kind, "contact message stored");
        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist.
    pub async fn mark_read(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE message SET is_read = TRUE WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message doesn't exist.
    pub async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM message WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_unread(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM message WHERE NOT is_read")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
