//! Decimal money amounts for order totals.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors parsing a money amount from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount is not a number: {0}")]
    NotANumber(String),
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative amount in the store currency, kept at two decimal places.
///
/// Quotes and orders are invoiced in a single currency, so unlike a
/// multi-currency price this only carries the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a `NUMERIC(12, 2)` column holds: 9,999,999,999.99.
    pub const MAX: Self = Self(Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2));

    /// Wrap a decimal, rounding half-away-from-zero to cents.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Parse user input such as `"1,250.00"` or `"$ 99.5"`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] when the input is not a number or is negative.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | ' '))
            .collect();
        let amount = Decimal::from_str(&cleaned)
            .map_err(|_| MoneyError::NotANumber(input.trim().to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self::new(amount))
    }

    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity, `None` on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self::new)
    }

    /// Add two amounts, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self::new)
    }

    /// Whether the amount fits the order total column.
    #[must_use]
    pub fn is_storable(self) -> bool {
        self <= Self::MAX
    }

    /// Plain two-decimal form used in form fields, e.g. `1250.00`.
    #[must_use]
    pub fn to_plain(self) -> String {
        format!("{:.2}", self.0)
    }
}

/// Formats as `$1,234.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.to_plain();
        let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        write!(f, "${grouped}.{cents}")
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self::new(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_formatted_input() {
        assert_eq!(Money::parse("1,250.00").unwrap().to_plain(), "1250.00");
        assert_eq!(Money::parse("$ 99.5").unwrap().to_plain(), "99.50");
        assert_eq!(Money::parse("0").unwrap(), Money::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage_and_negatives() {
        assert!(matches!(Money::parse("ten"), Err(MoneyError::NotANumber(_))));
        assert_eq!(Money::parse("-5"), Err(MoneyError::Negative));
    }

    #[test]
    fn test_rounds_to_cents() {
        assert_eq!(Money::parse("10.005").unwrap().to_plain(), "10.01");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::parse("1234567.8").unwrap().to_string(), "$1,234,567.80");
        assert_eq!(Money::parse("999").unwrap().to_string(), "$999.00");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_times_and_add() {
        let unit = Money::parse("12.50").unwrap();
        let total = unit
            .times(4)
            .and_then(|line| line.checked_add(Money::parse("0.75").unwrap()))
            .unwrap();
        assert_eq!(total.to_plain(), "50.75");
    }

    #[test]
    fn test_overflow_is_none() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.times(10), None);
        assert_eq!(huge.checked_add(Money::parse("1").unwrap()), None);
    }

    #[test]
    fn test_max_matches_total_column() {
        assert_eq!(Money::MAX.to_plain(), "9999999999.99");
        assert!(Money::MAX.is_storable());
        assert!(!Money::parse("10000000000").unwrap().is_storable());
    }
}
