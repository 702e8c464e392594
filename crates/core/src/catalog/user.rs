//! CMS users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;
use crate::types::{Email, UserId};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Blank keeps the current password on edit.
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    /// Plain-text password to hash, when one was supplied.
    pub password: Option<String>,
}

impl UserDraft {
    /// Validate the draft. A password is mandatory when `require_password`
    /// is set (new users) and optional otherwise.
    ///
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self, require_password: bool) -> Result<UserInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.required("name", &self.name, 120);
        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("email", e.to_string());
                None
            }
        };

        let password = if self.password.is_empty() {
            if require_password {
                errors.push("password", "is required");
            }
            None
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
            None
        } else {
            Some(self.password.clone())
        };

        match email {
            Some(email) if errors.is_empty() => Ok(UserInput {
                name,
                email,
                is_admin: self.is_admin,
                password,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(password: &str) -> UserDraft {
        UserDraft {
            name: "Dana Okafor".to_string(),
            email: "dana@kestrel-switchgear.com".to_string(),
            is_admin: true,
            password: password.to_string(),
        }
    }

    #[test]
    fn test_new_user_needs_password() {
        let errors = draft("").validate(true).unwrap_err();
        assert_eq!(errors.get("password"), Some("is required"));
    }

    #[test]
    fn test_edit_keeps_password_when_blank() {
        let input = draft("").validate(false).unwrap();
        assert_eq!(input.password, None);
    }

    #[test]
    fn test_short_password_rejected() {
        let errors = draft("short").validate(false).unwrap_err();
        assert!(errors.get("password").is_some());
        assert_eq!(
            draft("long-enough").validate(true).unwrap().password.as_deref(),
            Some("long-enough")
        );
    }
}
