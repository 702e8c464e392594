use serde::Serialize;

use crate::types::{ImageId, Slug};

/// A problem with one submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All problems found while validating a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} invalid field(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field error was pushed.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    /// Trim `value`, recording an error when it is blank or longer than `max`.
    pub(crate) fn required(&mut self, field: &'static str, value: &str, max: usize) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "is required");
        } else if trimmed.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
        trimmed.to_owned()
    }

    /// Trim `value`, recording an error only when it is too long.
    pub(crate) fn optional(&mut self, field: &'static str, value: &str, max: usize) -> String {
        let trimmed = value.trim();
        if trimmed.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
        trimmed.to_owned()
    }

    /// Parse an explicit slug, or derive one from `title` when blank.
    pub(crate) fn slug(
        &mut self,
        field: &'static str,
        explicit: &str,
        title: &str,
    ) -> Option<Slug> {
        match Slug::from_input_or_title(explicit, title) {
            Ok(slug) => Some(slug),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    /// Validate an optional image reference.
    pub(crate) fn image_id(&mut self, field: &'static str, id: Option<i32>) -> Option<ImageId> {
        match id {
            Some(raw) if raw <= 0 => {
                self.push(field, "must be a positive image id");
                None
            }
            other => other.map(ImageId::new),
        }
    }
}

/// Trim, drop blanks and drop duplicates while keeping order.
pub(crate) fn clean_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let trimmed = item.trim();
        if !trimmed.is_empty() && !out.iter().any(|o| o == trimmed) {
            out.push(trimmed.to_owned());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_optional() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.required("title", "  Panel  ", 10), "Panel");
        errors.required("name", "   ", 10);
        errors.optional("excerpt", &"x".repeat(11), 10);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("is required"));
        assert_eq!(errors.get("excerpt"), Some("must be at most 10 characters"));
        assert_eq!(errors.get("title"), None);
    }

    #[test]
    fn test_finish() {
        assert_eq!(ValidationErrors::new().finish(|| 3), Ok(3));

        let mut errors = ValidationErrors::new();
        errors.push("x", "bad");
        assert!(errors.finish(|| 3).is_err());
    }

    #[test]
    fn test_clean_list() {
        let raw = vec![
            " Utilities ".to_string(),
            String::new(),
            "Mining".to_string(),
            "Utilities".to_string(),
        ];
        assert_eq!(clean_list(&raw), vec!["Utilities", "Mining"]);
    }

    #[test]
    fn test_image_id_must_be_positive() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.image_id("image_id", Some(4)), Some(ImageId::new(4)));
        assert_eq!(errors.image_id("image_id", None), None);
        assert_eq!(errors.image_id("image_id", Some(0)), None);
        assert_eq!(errors.len(), 1);
    }
}
