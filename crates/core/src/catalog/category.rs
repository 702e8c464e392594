//! Product categories.
//!
//! Categories form a shallow tree: level-1 categories sit at the top of the
//! catalog and deeper levels name their parent by slug. The parent link is a
//! plain slug, so a renamed or deleted parent leaves children pointing at
//! nothing rather than failing the write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{ValidationErrors, clean_list};
use crate::types::{CategoryId, Slug};

pub const MAX_LEVEL: i32 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    /// Markdown body shown on the category page.
    pub content: String,
    pub keywords: Vec<String>,
    pub level: i32,
    pub parent_category: Option<Slug>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default)]
    pub parent_category: String,
}

const fn default_level() -> i32 {
    1
}

impl Default for CategoryDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            content: String::new(),
            keywords: Vec::new(),
            level: default_level(),
            parent_category: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub level: i32,
    pub parent_category: Option<Slug>,
}

impl CategoryDraft {
    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns every field problem found, including hierarchy rules:
    /// level-1 categories have no parent, deeper ones must have one, and a
    /// category cannot be its own parent.
    pub fn validate(&self) -> Result<CategoryInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.required("name", &self.name, 120);
        let slug = errors.slug("slug", &self.slug, &name);
        let description = errors.optional("description", &self.description, 1_000);
        let content = self.content.trim().to_owned();
        let keywords = clean_list(&self.keywords);

        if !(1..=MAX_LEVEL).contains(&self.level) {
            errors.push("level", format!("must be between 1 and {MAX_LEVEL}"));
        }

        let parent_category = match self.parent_category.trim() {
            "" => None,
            raw => match Slug::parse(raw) {
                Ok(parent) => Some(parent),
                Err(e) => {
                    errors.push("parent_category", e.to_string());
                    None
                }
            },
        };

        match (&parent_category, self.level) {
            (Some(_), 1) => {
                errors.push("parent_category", "top-level categories cannot have a parent");
            }
            (None, level) if level > 1 && self.parent_category.trim().is_empty() => {
                errors.push("parent_category", "is required below the top level");
            }
            _ => {}
        }

        if let (Some(own), Some(parent)) = (&slug, &parent_category)
            && own == parent
        {
            errors.push("parent_category", "a category cannot be its own parent");
        }

        match slug {
            Some(slug) if errors.is_empty() => Ok(CategoryInput {
                name,
                slug,
                description,
                content,
                keywords,
                level: self.level,
                parent_category,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.to_string(),
            description: category.description.clone(),
            content: category.content.clone(),
            keywords: category.keywords.clone(),
            level: category.level,
            parent_category: category
                .parent_category
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(level: i32, parent: &str) -> CategoryDraft {
        CategoryDraft {
            name: "Medium Voltage".to_string(),
            level,
            parent_category: parent.to_string(),
            keywords: vec!["mv".to_string(), "11kv".to_string(), "mv".to_string()],
            ..CategoryDraft::default()
        }
    }

    #[test]
    fn test_top_level_without_parent() {
        let input = draft(1, "").validate().unwrap();
        assert_eq!(input.slug.as_str(), "medium-voltage");
        assert_eq!(input.parent_category, None);
        assert_eq!(input.keywords, vec!["mv", "11kv"]);
    }

    #[test]
    fn test_child_needs_parent() {
        let errors = draft(2, "").validate().unwrap_err();
        assert_eq!(errors.get("parent_category"), Some("is required below the top level"));

        let input = draft(2, "switchgear").validate().unwrap();
        assert_eq!(input.parent_category.unwrap().as_str(), "switchgear");
    }

    #[test]
    fn test_top_level_cannot_have_parent() {
        assert!(draft(1, "switchgear").validate().is_err());
    }

    #[test]
    fn test_not_own_parent() {
        let errors = draft(2, "medium-voltage").validate().unwrap_err();
        assert_eq!(
            errors.get("parent_category"),
            Some("a category cannot be its own parent")
        );
    }

    #[test]
    fn test_level_bounds() {
        assert!(draft(0, "").validate().unwrap_err().get("level").is_some());
        assert!(draft(MAX_LEVEL + 1, "x").validate().unwrap_err().get("level").is_some());
    }
}
