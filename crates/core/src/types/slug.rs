//! URL slugs for catalog records.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,
    #[error("slug cannot start or end with a hyphen, or contain two in a row")]
    BadHyphen,
}

/// A URL-safe identifier such as `vacuum-circuit-breakers`.
///
/// Products, posts and categories are addressed by slug on the public site,
/// so the format is strict: lowercase ASCII letters, digits and single
/// hyphens between them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MAX_LENGTH: usize = 120;

    /// Parse a slug exactly as given.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if the input is not already a valid slug.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::BadHyphen);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a human title.
    ///
    /// ```
    /// use kestrel_core::Slug;
    ///
    /// let slug = Slug::from_title("11 kV Ring Main Unit (RMU)").unwrap();
    /// assert_eq!(slug.as_str(), "11-kv-ring-main-unit-rmu");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] when the title has no ASCII letters or digits.
    pub fn from_title(title: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(title.len());
        let mut pending_hyphen = false;

        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        if out.len() > Self::MAX_LENGTH {
            out.truncate(Self::MAX_LENGTH);
            while out.ends_with('-') {
                out.pop();
            }
        }

        Self::parse(&out)
    }

    /// Use `explicit` when it is non-blank, otherwise derive from `title`.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] from whichever path was taken.
    pub fn from_input_or_title(explicit: &str, title: &str) -> Result<Self, SlugError> {
        let explicit = explicit.trim();
        if explicit.is_empty() {
            Self::from_title(title)
        } else {
            Self::parse(explicit)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_valid() {
        assert!(Slug::parse("gis").is_ok());
        assert!(Slug::parse("33kv-gis-panel").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("Upper"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("with space"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("-lead"), Err(SlugError::BadHyphen));
        assert_eq!(Slug::parse("trail-"), Err(SlugError::BadHyphen));
        assert_eq!(Slug::parse("dou--ble"), Err(SlugError::BadHyphen));
    }

    #[test]
    fn test_from_title_collapses_punctuation() {
        let slug = Slug::from_title("  Low-Voltage  /  Motor Control Centres! ").unwrap();
        assert_eq!(slug.as_str(), "low-voltage-motor-control-centres");
    }

    #[test]
    fn test_from_title_without_alphanumerics() {
        assert_eq!(Slug::from_title("— ¿? —"), Err(SlugError::Empty));
    }

    #[test]
    fn test_from_title_truncates() {
        let slug = Slug::from_title(&"ab ".repeat(100)).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_from_input_or_title() {
        let derived = Slug::from_input_or_title("  ", "Arc Flash Study").unwrap();
        assert_eq!(derived.as_str(), "arc-flash-study");

        let explicit = Slug::from_input_or_title("afs", "Arc Flash Study").unwrap();
        assert_eq!(explicit.as_str(), "afs");

        assert!(Slug::from_input_or_title("Bad Slug", "x").is_err());
    }
}
