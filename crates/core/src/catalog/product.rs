//! Switchgear products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{ValidationErrors, clean_list};
use crate::types::{ImageId, ProductId, Slug};

/// One row of a product's technical data table, e.g. `Rated voltage: 12 kV`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    pub value: String,
}

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub specs: Vec<ProductSpec>,
    pub applications: Vec<String>,
    pub image_id: Option<ImageId>,
    /// Slug of the category this product is listed under.
    pub category: Slug,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated product fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub specs: Vec<ProductSpec>,
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub image_id: Option<i32>,
    pub category: String,
}

/// Validated product fields, ready to insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub title: String,
    pub slug: Slug,
    pub description: String,
    pub specs: Vec<ProductSpec>,
    pub applications: Vec<String>,
    pub image_id: Option<ImageId>,
    pub category: Slug,
}

impl ProductDraft {
    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = errors.required("title", &self.title, 200);
        let slug = errors.slug("slug", &self.slug, &title);
        let description = errors.required("description", &self.description, 20_000);

        let category = match Slug::parse(self.category.trim()) {
            Ok(slug) => Some(slug),
            Err(_) if self.category.trim().is_empty() => {
                errors.push("category", "is required");
                None
            }
            Err(e) => {
                errors.push("category", e.to_string());
                None
            }
        };

        let mut specs = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            let name = spec.name.trim();
            let value = spec.value.trim();
            if name.is_empty() && value.is_empty() {
                continue;
            }
            if name.is_empty() || value.is_empty() {
                errors.push(
                    "specs",
                    format!("specification \"{name}{value}\" needs both a name and a value"),
                );
                continue;
            }
            specs.push(ProductSpec {
                name: name.to_owned(),
                value: value.to_owned(),
            });
        }

        let applications = clean_list(&self.applications);
        let image_id = errors.image_id("image_id", self.image_id);

        match (slug, category) {
            (Some(slug), Some(category)) if errors.is_empty() => Ok(ProductInput {
                title,
                slug,
                description,
                specs,
                applications,
                image_id,
                category,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            slug: product.slug.to_string(),
            description: product.description.clone(),
            specs: product.specs.clone(),
            applications: product.applications.clone(),
            image_id: product.image_id.map(|id| id.as_i32()),
            category: product.category.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            title: "KX-12 Vacuum Circuit Breaker".to_string(),
            slug: String::new(),
            description: "Withdrawable VCB for 12 kV panels.".to_string(),
            specs: vec![
                ProductSpec {
                    name: " Rated voltage ".to_string(),
                    value: "12 kV".to_string(),
                },
                ProductSpec {
                    name: String::new(),
                    value: String::new(),
                },
            ],
            applications: vec!["Utilities".to_string(), " ".to_string()],
            image_id: Some(3),
            category: "circuit-breakers".to_string(),
        }
    }

    #[test]
    fn test_valid_draft_derives_slug() {
        let input = draft().validate().unwrap();
        assert_eq!(input.slug.as_str(), "kx-12-vacuum-circuit-breaker");
        assert_eq!(input.specs.len(), 1);
        assert_eq!(input.specs[0].name, "Rated voltage");
        assert_eq!(input.applications, vec!["Utilities"]);
        assert_eq!(input.image_id, Some(ImageId::new(3)));
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let bad = ProductDraft {
            title: " ".to_string(),
            description: String::new(),
            category: String::new(),
            ..ProductDraft::default()
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("is required"));
        assert_eq!(errors.get("description"), Some("is required"));
        assert_eq!(errors.get("category"), Some("is required"));
        assert!(errors.get("slug").is_some());
    }

    #[test]
    fn test_half_filled_spec_is_rejected() {
        let mut d = draft();
        d.specs.push(ProductSpec {
            name: "Breaking current".to_string(),
            value: " ".to_string(),
        });
        assert!(d.validate().unwrap_err().get("specs").is_some());
    }

    #[test]
    fn test_category_must_be_a_slug() {
        let mut d = draft();
        d.category = "Circuit Breakers".to_string();
        assert!(d.validate().unwrap_err().get("category").is_some());
    }
}
