//! Contact-form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;
use crate::types::{Email, MessageId, MessageKind};

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub kind: MessageKind,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Contact form submission as posted by a visitor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInput {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub kind: MessageKind,
    pub subject: String,
    pub message: String,
}

impl MessageDraft {
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<MessageInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.required("name", &self.name, 120);
        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("email", e.to_string());
                None
            }
        };
        let phone = errors.optional("phone", &self.phone, 40);
        if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'))
        {
            errors.push("phone", "may only contain digits, spaces and + - ( ) .");
        }

        let kind = match self.kind.trim() {
            "" => MessageKind::General,
            raw => raw.parse().unwrap_or_else(|e: crate::types::ParseStatusError| {
                errors.push("type", e.to_string());
                MessageKind::General
            }),
        };

        let subject = errors.required("subject", &self.subject, 200);
        let message = errors.required("message", &self.message, 10_000);

        match email {
            Some(email) if errors.is_empty() => Ok(MessageInput {
                name,
                email,
                phone: (!phone.is_empty()).then_some(phone),
                kind,
                subject,
                message,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> MessageDraft {
        MessageDraft {
            name: "Priya Raman".to_string(),
            email: "Priya@EPC-Contractor.com".to_string(),
            phone: "+44 (0)20 7946 0018".to_string(),
            kind: "quote".to_string(),
            subject: "RMU pricing".to_string(),
            message: "Need 14 units for a wind farm collector grid.".to_string(),
        }
    }

    #[test]
    fn test_valid_submission() {
        let input = draft().validate().unwrap();
        assert_eq!(input.email.as_str(), "priya@epc-contractor.com");
        assert_eq!(input.kind, MessageKind::Quote);
        assert_eq!(input.phone.as_deref(), Some("+44 (0)20 7946 0018"));
    }

    #[test]
    fn test_blank_phone_is_none() {
        let mut d = draft();
        d.phone = "  ".to_string();
        assert_eq!(d.validate().unwrap().phone, None);
    }

    #[test]
    fn test_invalid_fields() {
        let d = MessageDraft {
            email: "nobody".to_string(),
            phone: "call me".to_string(),
            kind: "spam".to_string(),
            ..MessageDraft::default()
        };
        let errors = d.validate().unwrap_err();
        for field in ["name", "email", "phone", "type", "subject", "message"] {
            assert!(errors.get(field).is_some(), "expected error for {field}");
        }
    }
}
