//! Status enums for catalog records.
//!
//! Each enum maps to a `PostgreSQL` enum type of the same name (see the
//! initial migration) and round-trips through its snake_case string form,
//! which is also what admin forms submit.

use serde::{Deserialize, Serialize};

/// Error for an unknown status string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `as_str`, `label`, `ALL`, `Display` and `FromStr` for a
/// fieldless enum from a `variant => ("wire", "Label")` table.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }) => {
        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The snake_case form stored in the database.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// Human readable label for templates.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Publication state of a blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "post_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

string_enum!(PostStatus, "post status", {
    Draft => ("draft", "Draft"),
    Published => ("published", "Published"),
});

/// Order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    Pending => ("pending", "Pending"),
    Processing => ("processing", "Processing"),
    Shipped => ("shipped", "Shipped"),
    Delivered => ("delivered", "Delivered"),
    Cancelled => ("cancelled", "Cancelled"),
});

impl OrderStatus {
    /// Whether the order still needs work from the sales team.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

/// What a contact-form message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "message_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    General,
    Quote,
    Support,
    Partnership,
}

string_enum!(MessageKind, "message type", {
    General => ("general", "General enquiry"),
    Quote => ("quote", "Request a quote"),
    Support => ("support", "Technical support"),
    Partnership => ("partnership", "Partnership"),
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(*status));
        }
        for kind in MessageKind::ALL {
            assert_eq!(kind.to_string().parse::<MessageKind>(), Ok(*kind));
        }
        assert_eq!("published".parse::<PostStatus>(), Ok(PostStatus::Published));
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let err = "archived".parse::<PostStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid post status: archived");
    }

    #[test]
    fn test_open_orders() {
        assert!(OrderStatus::Pending.is_open());
        assert!(OrderStatus::Processing.is_open());
        assert!(!OrderStatus::Shipped.is_open());
        assert!(!OrderStatus::Cancelled.is_open());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&MessageKind::Quote).unwrap_or_default();
        assert_eq!(json, "\"quote\"");
    }
}
