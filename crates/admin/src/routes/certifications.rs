//! Certification management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use kestrel_core::CertificationId;
use kestrel_core::catalog::{Certification, CertificationDraft, ValidationErrors};
use kestrel_core::db::CertificationRepository;

use crate::{
    error::{AppError, Result},
    filters,
    forms::CertificationForm,
    middleware::RequireAdminAuth,
    state::AppState,
};

use super::{
    SelectOption, conflict_as_field_error, dashboard::AdminUserView, load_image_options, render,
    render_invalid,
};

#[derive(Debug, Clone)]
pub struct CertificationRow {
    pub id: i32,
    pub name: String,
    pub issuing_body: String,
    pub image_id: Option<i32>,
}

#[derive(Template)]
#[template(path = "certifications/index.html")]
pub struct CertificationsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub certifications: Vec<CertificationRow>,
}

#[derive(Template)]
#[template(path = "certifications/form.html")]
pub struct CertificationFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub certification_id: Option<i32>,
    pub form: CertificationForm,
    pub errors: ValidationErrors,
    pub images: Vec<SelectOption>,
}

impl CertificationFormTemplate {
    fn action(&self) -> String {
        self.certification_id.map_or_else(
            || "/certifications".to_owned(),
            |id| format!("/certifications/{id}"),
        )
    }
}

async fn form_page(
    state: &AppState,
    admin: AdminUserView,
    certification_id: Option<CertificationId>,
    form: CertificationForm,
    errors: ValidationErrors,
) -> Result<CertificationFormTemplate> {
    let images = load_image_options(state.pool(), &form.image_id).await?;
    Ok(CertificationFormTemplate {
        admin_user: admin,
        current_path: "/certifications".to_string(),
        certification_id: certification_id.map(|id| id.as_i32()),
        form,
        errors,
        images,
    })
}

#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let certifications = CertificationRepository::new(state.pool()).list().await?;

    let template = CertificationsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/certifications".to_string(),
        certifications: certifications
            .iter()
            .map(|c| CertificationRow {
                id: c.id.as_i32(),
                name: c.name.clone(),
                issuing_body: c.issuing_body.clone(),
                image_id: c.image_id.map(|id| id.as_i32()),
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
        CertificationForm::default(),
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

#[instrument(skip(admin, state, form), fields(name = %form.name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<CertificationForm>,
) -> Result<Response> {
    let errors = match form.to_draft().validate() {
        Ok(input) => match CertificationRepository::new(state.pool()).create(&input).await {
            Ok(cert) => {
                tracing::info!(certification_id = %cert.id, "Certification created");
                return Ok(Redirect::to("/certifications").into_response());
            }
            Err(e) => conflict_as_field_error(e, "name")?,
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
    Path(id): Path<CertificationId>,
) -> Result<Html<String>> {
    let cert = find(&state, id).await?;
    let form = CertificationForm::from(&CertificationDraft::from(&cert));

    let page = form_page(
        &state,
        AdminUserView::from(&admin),
        Some(id),
        form,
        ValidationErrors::new(),
    )
    .await?;
    Ok(render(&page))
}

#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CertificationId>,
    Form(form): Form<CertificationForm>,
) -> Result<Response> {
    let errors = match form.to_draft().validate() {
        Ok(input) => match CertificationRepository::new(state.pool()).update(id, &input).await {
            Ok(_) => {
                tracing::info!(certification_id = %id, "Certification updated");
                return Ok(Redirect::to("/certifications").into_response());
            }
            Err(e) => conflict_as_field_error(e, "name")?,
        },
        Err(errors) => errors,
    };

    let page = form_page(&state, AdminUserView::from(&admin), Some(id), form, errors).await?;
    Ok(render_invalid(&page))
}

#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CertificationId>,
) -> Result<Redirect> {
    CertificationRepository::new(state.pool()).delete(id).await?;
    tracing::info!(certification_id = %id, "Certification deleted");
    Ok(Redirect::to("/certifications"))
}

async fn find(state: &AppState, id: CertificationId) -> Result<Certification> {
    CertificationRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("certification {id}")))
}
