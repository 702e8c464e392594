//! Customer orders entered by the sales team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;
use crate::types::{Money, OrderId, OrderStatus};

/// One order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product title or part number as quoted.
    pub product: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    /// `quantity × unit_price`, `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    pub customer_name: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInput {
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub notes: String,
}

impl OrderInput {
    /// Sum of all line totals. The stored `total_amount` always comes from here.
    ///
    /// `None` when the arithmetic overflows. Validated input always has a
    /// total within [`Money::MAX`].
    #[must_use]
    pub fn total(&self) -> Option<Money> {
        sum_lines(&self.items)
    }
}

fn sum_lines(items: &[OrderItem]) -> Option<Money> {
    items
        .iter()
        .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.line_total()?))
}

impl OrderDraft {
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<OrderInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let customer_name = errors.required("customer_name", &self.customer_name, 200);
        let notes = errors.optional("notes", &self.notes, 5_000);

        if self.items.is_empty() {
            errors.push("items", "an order needs at least one item");
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (i, item) in self.items.iter().enumerate() {
            let line = i + 1;
            let product = item.product.trim();
            if product.is_empty() {
                errors.push("items", format!("line {line}: product is required"));
            }
            if item.quantity == 0 {
                errors.push("items", format!("line {line}: quantity must be at least 1"));
            }
            if item.unit_price.amount().is_sign_negative() && !item.unit_price.amount().is_zero() {
                errors.push("items", format!("line {line}: unit price cannot be negative"));
            }
            if !item.line_total().is_some_and(Money::is_storable) {
                errors.push("items", format!("line {line}: line total exceeds {}", Money::MAX));
            }
            items.push(OrderItem {
                product: product.to_owned(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }

        let lines_ok = errors.get("items").is_none();
        if lines_ok && !sum_lines(&items).is_some_and(Money::is_storable) {
            errors.push("items", format!("order total exceeds {}", Money::MAX));
        }

        let status = match self.status.trim() {
            "" => OrderStatus::Pending,
            raw => raw.parse().unwrap_or_else(|e: crate::types::ParseStatusError| {
                errors.push("status", e.to_string());
                OrderStatus::Pending
            }),
        };

        errors.finish(|| OrderInput {
            customer_name,
            items,
            status,
            notes,
        })
    }
}

impl From<&Order> for OrderDraft {
    fn from(order: &Order) -> Self {
        Self {
            customer_name: order.customer_name.clone(),
            items: order.items.clone(),
            status: order.status.to_string(),
            notes: order.notes.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(product: &str, quantity: u32, price: &str) -> OrderItem {
        OrderItem {
            product: product.to_string(),
            quantity,
            unit_price: Money::parse(price).unwrap(),
        }
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let input = OrderDraft {
            customer_name: "Northgrid Utilities".to_string(),
            items: vec![item("KX-12 VCB", 3, "8450.00"), item("Relay panel", 1, "1200.50")],
            status: "processing".to_string(),
            notes: String::new(),
        }
        .validate()
        .unwrap();
        assert_eq!(input.status, OrderStatus::Processing);
        assert_eq!(input.total().unwrap().to_plain(), "26550.50");
    }

    #[test]
    fn test_requires_items() {
        let errors = OrderDraft {
            customer_name: "Acme".to_string(),
            ..OrderDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("items"), Some("an order needs at least one item"));
    }

    #[test]
    fn test_line_errors_are_numbered() {
        let errors = OrderDraft {
            customer_name: "Acme".to_string(),
            items: vec![item("ok", 1, "1"), item(" ", 0, "1")],
            ..OrderDraft::default()
        }
        .validate()
        .unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["line 2: product is required", "line 2: quantity must be at least 1"]
        );
    }

    #[test]
    fn test_overflowing_line_rejected() {
        let errors = OrderDraft {
            customer_name: "Acme".to_string(),
            items: vec![item("Busbar", 10, "79228162514264337593543950335")],
            ..OrderDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            errors.get("items"),
            Some("line 1: line total exceeds $9,999,999,999.99")
        );
    }

    #[test]
    fn test_line_above_column_maximum_rejected() {
        let errors = OrderDraft {
            customer_name: "Acme".to_string(),
            items: vec![item("Substation", 1, "100000000000")],
            ..OrderDraft::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("items").unwrap().starts_with("line 1:"));
    }

    #[test]
    fn test_total_above_column_maximum_rejected() {
        let errors = OrderDraft {
            customer_name: "Acme".to_string(),
            items: vec![item("Unit A", 1, "6000000000"), item("Unit B", 1, "6000000000")],
            ..OrderDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            errors.get("items"),
            Some("order total exceeds $9,999,999,999.99")
        );
    }

    #[test]
    fn test_total_at_column_maximum_accepted() {
        let input = OrderDraft {
            customer_name: "Acme".to_string(),
            items: vec![item("Unit A", 1, "9999999999.99")],
            ..OrderDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(input.total(), Some(Money::MAX));
    }

    #[test]
    fn test_unvalidated_overflow_total_is_none() {
        let input = OrderInput {
            customer_name: "Acme".to_string(),
            items: vec![item("a", 10, "79228162514264337593543950335")],
            status: OrderStatus::Pending,
            notes: String::new(),
        };
        assert_eq!(input.total(), None);
    }
}
