//! Category management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use kestrel_core::CategoryId;
use kestrel_core::catalog::category::MAX_LEVEL;
use kestrel_core::catalog::{Category, CategoryDraft, ValidationErrors};
use kestrel_core::db::CategoryRepository;

use crate::{
    error::{AppError, Result},
    filters,
    forms::CategoryForm,
    middleware::RequireAdminAuth,
    state::AppState,
};

use super::{
    SelectOption, conflict_as_field_error, dashboard::AdminUserView, format_timestamp, render,
    render_invalid,
};

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub level: i32,
    pub parent: String,
    pub keywords: String,
    pub updated: String,
    pub site_link: String,
}

#[derive(Template)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub categories: Vec<CategoryRow>,
}

#[derive(Template)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub category_id: Option<i32>,
    pub site_link: Option<String>,
    pub form: CategoryForm,
    pub errors: ValidationErrors,
    pub levels: Vec<SelectOption>,
    pub parents: Vec<SelectOption>,
}

impl CategoryFormTemplate {
    fn action(&self) -> String {
        self.category_id
            .map_or_else(|| "/categories".to_owned(), |id| format!("/categories/{id}"))
    }
}

/// Parent choices: every category above the deepest level except the one
/// being edited.
fn parent_options(
    all: &[Category],
    editing: Option<CategoryId>,
    current: &str,
) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", "(none, top level)", current))
        .chain(
            all.iter()
                .filter(|c| Some(c.id) != editing && c.level < MAX_LEVEL)
                .map(|c| {
                    SelectOption::new(
                        c.slug.as_str(),
                        format!("{} (level {})", c.name, c.level),
                        current,
                    )
                }),
        )
        .collect()
}

async fn form_page(
    state: &AppState,
    admin: AdminUserView,
    category: Option<&Category>,
    form: CategoryForm,
    errors: ValidationErrors,
) -> Result<CategoryFormTemplate> {
    let all = CategoryRepository::new(state.pool()).list().await?;
    let levels = (1..=MAX_LEVEL)
        .map(|l| SelectOption::new(l.to_string(), format!("Level {l}"), &form.level))
        .collect();

    Ok(CategoryFormTemplate {
        admin_user: admin,
        current_path: "/categories".to_string(),
        category_id: category.map(|c| c.id.as_i32()),
        site_link: category.map(|c| state.config().site_link(&format!("/categories/{}", c.slug))),
        parents: parent_options(&all, category.map(|c| c.id), &form.parent_category),
        levels,
        form,
        errors,
    })
}

/// Categories list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;

    let template = CategoriesIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/categories".to_string(),
        categories: categories
            .iter()
            .map(|c| CategoryRow {
                id: c.id.as_i32(),
                name: c.name.clone(),
                slug: c.slug.to_string(),
                level: c.level,
                parent: c
                    .parent_category
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                keywords: c.keywords.join(", "),
                updated: format_timestamp(c.updated_at),
                site_link: state.config().site_link(&format!("/categories/{}", c.slug)),
            })
            .collect(),
    };

    Ok(render(&template))
}

#[instrument(skip(admin, state))]
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let page = form_page(
        &state,
        AdminUserView::from(&admin),
        None,
        CategoryForm::default(),
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

#[instrument(skip(admin, state, form), fields(name = %form.name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let errors = match form.to_draft().validate() {
        Ok(input) => match CategoryRepository::new(state.pool()).create(&input).await {
            Ok(category) => {
                tracing::info!(
                    category_id = %category.id,
                    slug = %category.slug,
                    "Category created"
                );
                return Ok(Redirect::to("/categories").into_response());
            }
            Err(e) => conflict_as_field_error(e, "slug")?,
        },
        Err(errors) => errors,
    };

    let page = form_page(&state, AdminUserView::from(&admin), None, form, errors).await?;
    Ok(render_invalid(&page))
}

#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Html<String>> {
    let category = find(&state, id).await?;
    let form = CategoryForm::from(&CategoryDraft::from(&category));

    let page = form_page(
        &state,
        AdminUserView::from(&admin),
        Some(&category),
        form,
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

/// Update category handler. Renaming a slug does not rewrite the products
/// or child categories that point at the old one.
#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let category = find(&state, id).await?;

    let errors = match form.to_draft().validate() {
        Ok(input) => match CategoryRepository::new(state.pool()).update(id, &input).await {
            Ok(updated) => {
                if updated.slug != category.slug {
                    tracing::warn!(
                        old = %category.slug,
                        new = %updated.slug,
                        "Category slug changed; references to the old slug are not updated"
                    );
                }
                return Ok(Redirect::to("/categories").into_response());
            }
            Err(e) => conflict_as_field_error(e, "slug")?,
        },
        Err(errors) => errors,
    };

    let page = form_page(&state, AdminUserView::from(&admin), Some(&category), form, errors).await?;
    Ok(render_invalid(&page))
}

#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Redirect> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    tracing::info!(category_id = %id, "Category deleted");
    Ok(Redirect::to("/categories"))
}

async fn find(state: &AppState, id: CategoryId) -> Result<Category> {
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kestrel_core::Slug;

    fn category(id: i32, slug: &str, level: i32) -> Category {
        Category {
            id: CategoryId::new(id),
            name: slug.to_uppercase(),
            slug: Slug::parse(slug).unwrap(),
            description: String::new(),
            content: String::new(),
            keywords: Vec::new(),
            level,
            parent_category: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parent_options_exclude_self_and_deepest_level() {
        let all = vec![
            category(1, "switchgear", 1),
            category(2, "ring-main-units", 2),
            category(3, "sf6-free", MAX_LEVEL),
        ];
        let options = parent_options(&all, Some(CategoryId::new(2)), "switchgear");
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["", "switchgear"]);
        assert!(options.iter().any(|o| o.selected && o.value == "switchgear"));
    }
}
