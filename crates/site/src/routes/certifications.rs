//! Certifications page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use kestrel_core::catalog::Certification;
use kestrel_core::db::CertificationRepository;

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "certifications.html")]
pub struct CertificationsTemplate {
    pub certifications: Vec<Certification>,
}

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<CertificationsTemplate> {
    let certifications = CertificationRepository::new(state.pool()).list().await?;
    Ok(CertificationsTemplate { certifications })
}
