//! HTML form bodies and the text formats of their multi-value fields.
//!
//! Browsers post every field as a string, so each form struct here holds raw
//! strings and converts into the matching catalog draft. List-valued fields
//! are edited as plain text:
//!
//! | field | format |
//! |---|---|
//! | product specs | one `Name: Value` per line |
//! | product applications | one per line |
//! | category keywords | comma-separated |
//! | order items | one `product \| quantity \| unit price` per line |

use serde::Deserialize;

use kestrel_core::Money;
use kestrel_core::catalog::{
    BlogPostDraft, CategoryDraft, CertificationDraft, OrderDraft, OrderItem, ProductDraft,
    ProductSpec, UserDraft, ValidationErrors,
};

/// Split a specs textarea into name/value pairs at the first colon.
///
/// A line without a colon becomes a spec with an empty value, which
/// validation then reports.
#[must_use]
pub fn parse_specs(text: &str) -> Vec<ProductSpec> {
    non_blank_lines(text)
        .map(|line| {
            let (name, value) = line.split_once(':').unwrap_or((line, ""));
            ProductSpec {
                name: name.trim().to_owned(),
                value: value.trim().to_owned(),
            }
        })
        .collect()
}

#[must_use]
pub fn format_specs(specs: &[ProductSpec]) -> String {
    specs
        .iter()
        .map(|s| format!("{}: {}", s.name, s.value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One entry per non-blank line.
#[must_use]
pub fn parse_lines(text: &str) -> Vec<String> {
    non_blank_lines(text).map(str::to_owned).collect()
}

/// Comma-separated keywords, blanks dropped.
#[must_use]
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse order lines of the form `product | quantity | unit price`.
///
/// Lines that cannot be read are reported by line number under the `items`
/// field; the rest are returned so the other checks can still run.
pub fn parse_items(text: &str) -> (Vec<OrderItem>, ValidationErrors) {
    let mut items = Vec::new();
    let mut errors = ValidationErrors::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let n = i + 1;
        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        let [product, quantity, price] = parts.as_slice() else {
            errors.push(
                "items",
                format!("line {n}: expected \"product | quantity | unit price\""),
            );
            continue;
        };

        let quantity = match quantity.parse::<u32>() {
            Ok(q) => q,
            Err(_) => {
                errors.push("items", format!("line {n}: quantity must be a whole number"));
                continue;
            }
        };
        let unit_price = match Money::parse(price) {
            Ok(p) => p,
            Err(e) => {
                errors.push("items", format!("line {n}: {e}"));
                continue;
            }
        };

        items.push(OrderItem {
            product: (*product).to_owned(),
            quantity,
            unit_price,
        });
    }

    (items, errors)
}

#[must_use]
pub fn format_items(items: &[OrderItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{} | {} | {}",
                item.product,
                item.quantity,
                item.unit_price.to_plain()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Blank or non-numeric selects mean "no image".
fn parse_image_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn image_field(id: Option<i32>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

// =============================================================================
// Form bodies
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specs: String,
    #[serde(default)]
    pub applications: String,
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub category: String,
}

impl ProductForm {
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            specs: parse_specs(&self.specs),
            applications: parse_lines(&self.applications),
            image_id: parse_image_id(&self.image_id),
            category: self.category.clone(),
        }
    }
}

impl From<&ProductDraft> for ProductForm {
    fn from(draft: &ProductDraft) -> Self {
        Self {
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            specs: format_specs(&draft.specs),
            applications: draft.applications.join("\n"),
            image_id: image_field(draft.image_id),
            category: draft.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub status: String,
}

impl BlogPostForm {
    #[must_use]
    pub fn to_draft(&self) -> BlogPostDraft {
        BlogPostDraft {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            date: self.date.clone(),
            author: self.author.clone(),
            image_id: parse_image_id(&self.image_id),
            status: self.status.clone(),
        }
    }
}

impl From<&BlogPostDraft> for BlogPostForm {
    fn from(draft: &BlogPostDraft) -> Self {
        Self {
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            excerpt: draft.excerpt.clone(),
            content: draft.content.clone(),
            date: draft.date.clone(),
            author: draft.author.clone(),
            image_id: image_field(draft.image_id),
            status: draft.status.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub parent_category: String,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self::from(&CategoryDraft::default())
    }
}

impl CategoryForm {
    /// An unreadable level becomes 0, which validation rejects.
    #[must_use]
    pub fn to_draft(&self) -> CategoryDraft {
        CategoryDraft {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            keywords: parse_keywords(&self.keywords),
            level: self.level.trim().parse().unwrap_or(0),
            parent_category: self.parent_category.clone(),
        }
    }
}

impl From<&CategoryDraft> for CategoryForm {
    fn from(draft: &CategoryDraft) -> Self {
        Self {
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
            keywords: draft.keywords.join(", "),
            level: draft.level.to_string(),
            parent_category: draft.parent_category.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuing_body: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_id: String,
}

impl CertificationForm {
    #[must_use]
    pub fn to_draft(&self) -> CertificationDraft {
        CertificationDraft {
            name: self.name.clone(),
            issuing_body: self.issuing_body.clone(),
            description: self.description.clone(),
            image_id: parse_image_id(&self.image_id),
        }
    }
}

impl From<&CertificationDraft> for CertificationForm {
    fn from(draft: &CertificationDraft) -> Self {
        Self {
            name: draft.name.clone(),
            issuing_body: draft.issuing_body.clone(),
            description: draft.description.clone(),
            image_id: image_field(draft.image_id),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub items: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
}

impl OrderForm {
    /// Build and validate the order in one step, since unreadable item lines
    /// are already errors.
    ///
    /// # Errors
    ///
    /// Returns item parse errors together with every validation problem.
    pub fn validate(&self) -> Result<kestrel_core::catalog::OrderInput, ValidationErrors> {
        let (items, mut errors) = parse_items(&self.items);
        let draft = OrderDraft {
            customer_name: self.customer_name.clone(),
            items,
            status: self.status.clone(),
            notes: self.notes.clone(),
        };

        match draft.validate() {
            Ok(input) if errors.is_empty() => Ok(input),
            Ok(_) => Err(errors),
            Err(more) => {
                // "needs at least one item" is noise when every line failed to parse
                let skip_empty = !errors.is_empty() && draft.items.is_empty();
                for e in more.iter() {
                    if !(skip_empty && e.field == "items") {
                        errors.push(e.field, e.message.clone());
                    }
                }
                Err(errors)
            }
        }
    }
}

impl From<&OrderDraft> for OrderForm {
    fn from(draft: &OrderDraft) -> Self {
        Self {
            customer_name: draft.customer_name.clone(),
            items: format_items(&draft.items),
            status: draft.status.clone(),
            notes: draft.notes.clone(),
        }
    }
}

/// Quick status change from the order page.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusForm {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Checkbox: present only when ticked.
    #[serde(default)]
    pub is_admin: Option<String>,
    #[serde(default)]
    pub password: String,
}

impl UserForm {
    #[must_use]
    pub fn to_draft(&self) -> UserDraft {
        UserDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin.is_some(),
            password: self.password.clone(),
        }
    }

    /// Pre-filled edit form; the password is never echoed back.
    #[must_use]
    pub fn from_user(user: &kestrel_core::catalog::User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.to_string(),
            is_admin: user.is_admin.then(|| "on".to_owned()),
            password: String::new(),
        }
    }

    #[must_use]
    pub const fn admin_checked(&self) -> bool {
        self.is_admin.is_some()
    }
}

/// Login form body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Add a single error to a fresh list, for checks that live outside the
/// catalog validators (self-demotion, duplicate slugs).
#[must_use]
pub fn single_error(field: &'static str, message: impl Into<String>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.push(field, message);
    errors
}

/// Append every error in `extra` to `errors`.
pub fn extend_errors(errors: &mut ValidationErrors, extra: &ValidationErrors) {
    for e in extra.iter() {
        errors.push(e.field, e.message.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_specs_splits_at_first_colon() {
        let specs = parse_specs("Rated voltage: 12 kV\n\n  Ratio: 1:5 \nIP rating");
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].name, "Rated voltage");
        assert_eq!(specs[0].value, "12 kV");
        assert_eq!(specs[1].value, "1:5");
        assert_eq!(specs[2].name, "IP rating");
        assert_eq!(specs[2].value, "");
    }

    #[test]
    fn test_specs_text_round_trip() {
        let text = "Rated voltage: 12 kV\nRated current: 630 A";
        assert_eq!(format_specs(&parse_specs(text)), text);
    }

    #[test]
    fn test_parse_lines_and_keywords() {
        assert_eq!(
            parse_lines("Utilities\n \n  Mining  \n"),
            vec!["Utilities", "Mining"]
        );
        assert_eq!(parse_keywords("mv, 11kV ,,rmu"), vec!["mv", "11kV", "rmu"]);
        assert!(parse_keywords(" , ").is_empty());
    }

    #[test]
    fn test_parse_items() {
        let (items, errors) =
            parse_items("KX-12 VCB | 3 | 8,450.00\n\nRelay panel | 1 | $1200.5");
        assert!(errors.is_empty());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].unit_price.to_plain(), "8450.00");
        assert_eq!(items[1].unit_price.to_plain(), "1200.50");
    }

    #[test]
    fn test_parse_items_reports_line_numbers() {
        let (items, errors) =
            parse_items("ok | 1 | 10\nmissing columns\nbad | two | 5\nneg | 1 | -3");
        assert_eq!(items.len(), 1);
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("line 2:"));
        assert_eq!(messages[1], "line 3: quantity must be a whole number");
        assert_eq!(messages[2], "line 4: amount cannot be negative");
    }

    #[test]
    fn test_order_form_validate() {
        let form = OrderForm {
            customer_name: "Northgrid Utilities".to_string(),
            items: "KX-12 VCB | 2 | 100\nRMU | 1 | 50.25".to_string(),
            status: "processing".to_string(),
            notes: String::new(),
        };
        let input = form.validate().unwrap();
        assert_eq!(input.total().unwrap().to_plain(), "250.25");
    }

    #[test]
    fn test_order_form_skips_empty_items_error_after_parse_failure() {
        let form = OrderForm {
            customer_name: String::new(),
            items: "garbage".to_string(),
            ..OrderForm::default()
        };
        let errors = form.validate().unwrap_err();
        let items: Vec<_> = errors.iter().filter(|e| e.field == "items").collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].message.starts_with("line 1:"));
        assert_eq!(errors.get("customer_name"), Some("is required"));
    }

    #[test]
    fn test_order_form_rejects_zero_quantity() {
        let form = OrderForm {
            customer_name: "Acme".to_string(),
            items: "Breaker | 0 | 10".to_string(),
            ..OrderForm::default()
        };
        assert_eq!(
            form.validate().unwrap_err().get("items"),
            Some("line 1: quantity must be at least 1")
        );
    }

    #[test]
    fn test_category_form_bad_level_fails_validation() {
        let form = CategoryForm {
            name: "Ring main units".to_string(),
            level: "two".to_string(),
            ..CategoryForm::default()
        };
        assert!(form.to_draft().validate().unwrap_err().get("level").is_some());
    }

    #[test]
    fn test_product_form_maps_textareas() {
        let form = ProductForm {
            title: "KX-12".to_string(),
            description: "VCB".to_string(),
            specs: "Rated voltage: 12 kV".to_string(),
            applications: "Utilities\nMining".to_string(),
            image_id: "7".to_string(),
            category: "circuit-breakers".to_string(),
            ..ProductForm::default()
        };
        let draft = form.to_draft();
        assert_eq!(draft.image_id, Some(7));
        assert_eq!(draft.applications.len(), 2);
        let back = ProductForm::from(&draft);
        assert_eq!(back.specs, "Rated voltage: 12 kV");
        assert_eq!(back.image_id, "7");
    }

    #[test]
    fn test_user_form_checkbox() {
        let mut form = UserForm {
            name: "Dana".to_string(),
            email: "dana@kestrel-switchgear.com".to_string(),
            ..UserForm::default()
        };
        assert!(!form.to_draft().is_admin);
        form.is_admin = Some("on".to_string());
        assert!(form.to_draft().is_admin);
    }
}
