//! Product management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use kestrel_core::ProductId;
use kestrel_core::catalog::{Product, ProductDraft, ValidationErrors};
use kestrel_core::db::{CategoryRepository, ProductRepository};

use crate::{
    error::{AppError, Result},
    filters,
    forms::ProductForm,
    middleware::RequireAdminAuth,
    state::AppState,
};

use super::{
    SelectOption, conflict_as_field_error, dashboard::AdminUserView, format_timestamp,
    load_image_options, render, render_invalid,
};

/// Product row for the listing.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub specs: usize,
    pub updated: String,
    pub site_link: String,
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub products: Vec<ProductRow>,
}

/// Product create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    /// `None` while creating.
    pub product_id: Option<i32>,
    pub site_link: Option<String>,
    pub form: ProductForm,
    pub errors: ValidationErrors,
    pub categories: Vec<SelectOption>,
    pub images: Vec<SelectOption>,
}

impl ProductFormTemplate {
    fn action(&self) -> String {
        self.product_id
            .map_or_else(|| "/products".to_owned(), |id| format!("/products/{id}"))
    }
}

/// Build the form page, loading the category and image pickers.
async fn form_page(
    state: &AppState,
    admin: AdminUserView,
    product: Option<&Product>,
    form: ProductForm,
    errors: ValidationErrors,
) -> Result<ProductFormTemplate> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let categories = std::iter::once(SelectOption::new("", "(choose a category)", &form.category))
        .chain(categories.iter().map(|c| {
            let indent = "— ".repeat(usize::try_from(c.level - 1).unwrap_or(0));
            SelectOption::new(c.slug.as_str(), format!("{indent}{}", c.name), &form.category)
        }))
        .collect();
    let images = load_image_options(state.pool(), &form.image_id).await?;

    Ok(ProductFormTemplate {
        admin_user: admin,
        current_path: "/products".to_string(),
        product_id: product.map(|p| p.id.as_i32()),
        site_link: product.map(|p| state.config().site_link(&format!("/products/{}", p.slug))),
        form,
        errors,
        categories,
        images,
    })
}

/// Products list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let products = ProductRepository::new(state.pool()).list().await?;

    let template = ProductsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        products: products
            .iter()
            .map(|p| ProductRow {
                id: p.id.as_i32(),
                title: p.title.clone(),
                slug: p.slug.to_string(),
                category: p.category.to_string(),
                specs: p.specs.len(),
                updated: format_timestamp(p.updated_at),
                site_link: state.config().site_link(&format!("/products/{}", p.slug)),
            })
            .collect(),
    };

    Ok(render(&template))
}

/// New product form handler.
#[instrument(skip(admin, state))]
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let page = form_page(
        &state,
        AdminUserView::from(&admin),
        None,
        ProductForm::default(),
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

/// Create product handler.
#[instrument(skip(admin, state, form), fields(title = %form.title))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let errors = match form.to_draft().validate() {
        Ok(input) => match ProductRepository::new(state.pool()).create(&input).await {
            Ok(product) => {
                tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
                return Ok(Redirect::to("/products").into_response());
            }
            Err(e) => conflict_as_field_error(e, "slug")?,
        },
        Err(errors) => errors,
    };

    let page = form_page(&state, AdminUserView::from(&admin), None, form, errors).await?;
    Ok(render_invalid(&page))
}

/// Edit product form handler.
#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Html<String>> {
    let product = find(&state, id).await?;
    let form = ProductForm::from(&ProductDraft::from(&product));

    let page = form_page(
        &state,
        AdminUserView::from(&admin),
        Some(&product),
        form,
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

/// Update product handler.
#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product = find(&state, id).await?;

    let errors = match form.to_draft().validate() {
        Ok(input) => match ProductRepository::new(state.pool()).update(id, &input).await {
            Ok(_) => {
                tracing::info!(product_id = %id, "Product updated");
                return Ok(Redirect::to("/products").into_response());
            }
            Err(e) => conflict_as_field_error(e, "slug")?,
        },
        Err(errors) => errors,
    };

    let page = form_page(&state, AdminUserView::from(&admin), Some(&product), form, errors).await?;
    Ok(render_invalid(&page))
}

/// Delete product handler.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Redirect::to("/products"))
}

async fn find(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
