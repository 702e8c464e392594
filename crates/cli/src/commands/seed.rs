//! Seed the catalog from a YAML file.
//!
//! The file has three optional lists, using the same field names as the
//! admin forms:
//!
//! ```yaml
//! categories:
//!   - name: Ring Main Units
//!     slug: ring-main-units
//!     level: 1
//! products:
//!   - title: KRM-12 Ring Main Unit
//!     category: ring-main-units
//!     description: ...
//!     specs:
//!       - { name: Rated voltage, value: 12 kV }
//! certifications:
//!   - name: ISO 9001:2015
//!     issuing_body: Bureau Veritas
//! ```
//!
//! Every record is validated before the first write. Categories are upserted
//! by slug (parents before children), products by slug and certifications by
//! name, so running the same file twice changes nothing.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use kestrel_core::catalog::{
    CategoryDraft, CategoryInput, CertificationDraft, CertificationInput, ProductDraft,
    ProductInput, ValidationErrors,
};
use kestrel_core::db::{
    CategoryRepository, CertificationRepository, ProductRepository, RepositoryError,
};

use super::MissingDatabaseUrl;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} invalid record(s) in seed file")]
    Invalid(usize),

    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Raw file contents.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategoryDraft>,
    #[serde(default)]
    pub products: Vec<ProductDraft>,
    #[serde(default)]
    pub certifications: Vec<CertificationDraft>,
}

/// Validated records, categories ordered by level.
#[derive(Debug, Default)]
pub struct ValidatedSeed {
    pub categories: Vec<CategoryInput>,
    pub products: Vec<ProductInput>,
    pub certifications: Vec<CertificationInput>,
}

/// Counts reported after a run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub certifications: usize,
}

/// One record that failed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordError {
    /// e.g. `products[2] (KRM-12)`.
    pub record: String,
    pub message: String,
}

fn describe(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn check<D, I>(
    kind: &str,
    drafts: &[D],
    label: impl Fn(&D) -> &str,
    validate: impl Fn(&D) -> Result<I, ValidationErrors>,
    problems: &mut Vec<RecordError>,
) -> Vec<I> {
    let mut valid = Vec::with_capacity(drafts.len());
    for (i, draft) in drafts.iter().enumerate() {
        match validate(draft) {
            Ok(input) => valid.push(input),
            Err(errors) => problems.push(RecordError {
                record: format!("{kind}[{i}] ({})", label(draft)),
                message: describe(&errors),
            }),
        }
    }
    valid
}

impl CatalogSeed {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Yaml`] for malformed YAML or unknown keys.
    pub fn from_yaml(text: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validate every record.
    ///
    /// Besides the per-record rules, product categories and category parents
    /// must name a category defined in the same file.
    ///
    /// # Errors
    ///
    /// Returns every failing record.
    pub fn validate(&self) -> Result<ValidatedSeed, Vec<RecordError>> {
        let mut problems = Vec::new();

        let mut categories = check(
            "categories",
            &self.categories,
            |c| c.name.as_str(),
            CategoryDraft::validate,
            &mut problems,
        );
        let products = check(
            "products",
            &self.products,
            |p| p.title.as_str(),
            ProductDraft::validate,
            &mut problems,
        );
        let certifications = check(
            "certifications",
            &self.certifications,
            |c| c.name.as_str(),
            CertificationDraft::validate,
            &mut problems,
        );

        let known = |slug: &kestrel_core::Slug| categories.iter().any(|c| &c.slug == slug);
        for category in &categories {
            if let Some(parent) = &category.parent_category
                && !known(parent)
            {
                problems.push(RecordError {
                    record: format!("categories ({})", category.name),
                    message: format!("parent_category: unknown category {parent}"),
                });
            }
        }
        for product in &products {
            if !known(&product.category) {
                problems.push(RecordError {
                    record: format!("products ({})", product.title),
                    message: format!("category: unknown category {}", product.category),
                });
            }
        }

        if !problems.is_empty() {
            return Err(problems);
        }

        // Parents first
        categories.sort_by_key(|c| c.level);
        Ok(ValidatedSeed {
            categories,
            products,
            certifications,
        })
    }
}

/// Seed the catalog from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any record is
/// invalid, or a database write fails.
pub async fn catalog(path: &Path) -> Result<SeedSummary, SeedError> {
    info!(path = %path.display(), "Loading catalog seed");

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let seed = CatalogSeed::from_yaml(&text)?;

    // Validate everything before connecting to the database
    let seed = match seed.validate() {
        Ok(seed) => seed,
        Err(problems) => {
            error!("Seed validation failed:");
            for p in &problems {
                error!("  - {}: {}", p.record, p.message);
            }
            return Err(SeedError::Invalid(problems.len()));
        }
    };

    let pool = kestrel_core::db::create_pool(&super::database_url()?).await?;
    info!("Connected to database");

    let categories = CategoryRepository::new(&pool);
    for input in &seed.categories {
        categories.upsert_by_slug(input).await?;
    }

    let products = ProductRepository::new(&pool);
    for input in &seed.products {
        products.upsert_by_slug(input).await?;
    }

    let certifications = CertificationRepository::new(&pool);
    for input in &seed.certifications {
        certifications.upsert_by_name(input).await?;
    }

    let summary = SeedSummary {
        categories: seed.categories.len(),
        products: seed.products.len(),
        certifications: seed.certifications.len(),
    };
    info!(
        categories = summary.categories,
        products = summary.products,
        certifications = summary.certifications,
        "Seeding complete"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SEED: &str = r"
categories:
  - name: Ring Main Units Compact
    slug: compact-rmu
    level: 2
    parent_category: ring-main-units
  - name: Ring Main Units
    slug: ring-main-units
    level: 1
    keywords: [rmu, secondary distribution]
products:
  - title: KRM-12 Ring Main Unit
    category: ring-main-units
    description: SF6-free ring main unit for 12 kV networks.
    specs:
      - { name: Rated voltage, value: 12 kV }
      - { name: Rated current, value: 630 A }
    applications: [Utility substations, Wind farms]
certifications:
  - name: ISO 9001:2015
    issuing_body: Bureau Veritas
";

    #[test]
    fn test_valid_seed_orders_parents_first() {
        let seed = CatalogSeed::from_yaml(SEED).unwrap().validate().unwrap();
        assert_eq!(seed.categories[0].slug.as_str(), "ring-main-units");
        assert_eq!(seed.categories[1].slug.as_str(), "compact-rmu");
        assert_eq!(seed.products[0].specs.len(), 2);
        assert_eq!(seed.certifications[0].issuing_body, "Bureau Veritas");
    }

    #[test]
    fn test_unknown_product_category_rejected() {
        let yaml = r"
products:
  - title: Orphan Breaker
    category: breakers
    description: Vacuum circuit breaker.
";
        let problems = CatalogSeed::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("unknown category breakers"));
    }

    #[test]
    fn test_invalid_records_are_labelled() {
        let yaml = r"
certifications:
  - name: ''
    issuing_body: IEC
";
        let problems = CatalogSeed::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert!(problems[0].record.starts_with("certifications[0]"));
        assert!(problems[0].message.contains("name"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            CatalogSeed::from_yaml("industries: []"),
            Err(SeedError::Yaml(_))
        ));
    }

    #[test]
    fn test_empty_file_is_an_empty_seed() {
        let seed = CatalogSeed::from_yaml("{}").unwrap().validate().unwrap();
        assert!(seed.categories.is_empty());
        assert!(seed.products.is_empty());
    }
}
