//! Order repository.
//!
//! `total_amount` is always written from [`OrderInput::total`], never taken
//! from user input.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::{RepositoryError, expect_rows};
use crate::catalog::{Order, OrderInput, OrderItem};
use crate::types::{Money, OrderId, OrderStatus};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_name: String,
    items: Json<Vec<OrderItem>>,
    total_amount: Money,
    status: OrderStatus,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            customer_name: row.customer_name,
            items: row.items.0,
            total_amount: row.total_amount,
            status: row.status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The total to write, or `OutOfRange` if it overflows or exceeds the column.
fn stored_total(input: &OrderInput) -> Result<Money, RepositoryError> {
    input
        .total()
        .filter(|total| total.is_storable())
        .ok_or_else(|| RepositoryError::OutOfRange(format!("order total exceeds {}", Money::MAX)))
}

const COLUMNS: &str =
    "id, customer_name, items, total_amount, status, notes, created_at, updated_at";

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM customer_order \
             WHERE $1::order_status IS NULL OR status = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM customer_order WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::OutOfRange` if the total does not fit, or
    /// `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &OrderInput) -> Result<Order, RepositoryError> {
        let total = stored_total(input)?;
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO customer_order (customer_name, items, total_amount, status, notes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        ))
        .bind(&input.customer_name)
        .bind(Json(&input.items))
        .bind(total)
        .bind(input.status)
        .bind(&input.notes)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(order_id = row.id, total = %total, "order created");
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist, or
    /// `RepositoryError::OutOfRange` if the total does not fit.
    pub async fn update(&self, id: OrderId, input: &OrderInput) -> Result<Order, RepositoryError> {
        let total = stored_total(input)?;
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE customer_order \
             SET customer_name = $2, items = $3, total_amount = $4, status = $5, notes = $6, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&input.customer_name)
        .bind(Json(&input.items))
        .bind(total)
        .bind(input.status)
        .bind(&input.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE customer_order SET status = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i32())
                .bind(status)
                .execute(self.pool)
                .await?;

        tracing::info!(order_id = %id, status = %status, "order status changed");
        expect_rows(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM customer_order WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        expect_rows(result.rows_affected())
    }

    /// Order counts for every status, in [`OrderStatus::ALL`] order.
    /// Statuses without orders are reported as zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, RepositoryError> {
        let rows: Vec<(OrderStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM customer_order GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        Ok(OrderStatus::ALL
            .iter()
            .map(|status| {
                let count = rows
                    .iter()
                    .find(|(s, _)| s == status)
                    .map_or(0, |(_, c)| *c);
                (*status, count)
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(unit_price: &str, quantity: u32) -> OrderInput {
        OrderInput {
            customer_name: "Northgrid Utilities".to_string(),
            items: vec![OrderItem {
                product: "KX-12 VCB".to_string(),
                quantity,
                unit_price: Money::parse(unit_price).unwrap(),
            }],
            status: OrderStatus::Pending,
            notes: String::new(),
        }
    }

    #[test]
    fn test_stored_total_within_column() {
        assert_eq!(stored_total(&input("8450.00", 3)).unwrap().to_plain(), "25350.00");
    }

    #[test]
    fn test_stored_total_rejects_overflow_and_oversize() {
        assert!(matches!(
            stored_total(&input("79228162514264337593543950335", 10)),
            Err(RepositoryError::OutOfRange(_))
        ));
        assert!(matches!(
            stored_total(&input("100000000000", 1)),
            Err(RepositoryError::OutOfRange(_))
        ));
    }
}
