//! Quality and type-test certifications (ISO 9001, IEC 62271 type tests, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;
use crate::types::{CertificationId, ImageId};

#[derive(Debug, Clone, Serialize)]
pub struct Certification {
    pub id: CertificationId,
    pub name: String,
    pub issuing_body: String,
    pub description: String,
    pub image_id: Option<ImageId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificationDraft {
    pub name: String,
    pub issuing_body: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationInput {
    pub name: String,
    pub issuing_body: String,
    pub description: String,
    pub image_id: Option<ImageId>,
}

impl CertificationDraft {
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<CertificationInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.required("name", &self.name, 200);
        let issuing_body = errors.required("issuing_body", &self.issuing_body, 200);
        let description = errors.optional("description", &self.description, 5_000);
        let image_id = errors.image_id("image_id", self.image_id);

        errors.finish(|| CertificationInput {
            name,
            issuing_body,
            description,
            image_id,
        })
    }
}

impl From<&Certification> for CertificationDraft {
    fn from(cert: &Certification) -> Self {
        Self {
            name: cert.name.clone(),
            issuing_body: cert.issuing_body.clone(),
            description: cert.description.clone(),
            image_id: cert.image_id.map(|id| id.as_i32()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_name_and_body() {
        let errors = CertificationDraft::default().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("is required"));
        assert_eq!(errors.get("issuing_body"), Some("is required"));
    }

    #[test]
    fn test_valid() {
        let input = CertificationDraft {
            name: " ISO 9001:2015 ".to_string(),
            issuing_body: "Bureau Veritas".to_string(),
            description: String::new(),
            image_id: None,
        }
        .validate()
        .unwrap();
        assert_eq!(input.name, "ISO 9001:2015");
    }
}
