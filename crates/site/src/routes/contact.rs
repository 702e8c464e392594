//! Contact form.
//!
//! Submissions are stored as messages for the CMS inbox, then the sales team
//! is emailed in the background when SMTP is configured.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use kestrel_core::MessageKind;
use kestrel_core::catalog::{MessageDraft, ValidationErrors};
use kestrel_core::db::MessageRepository;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::contact_rate_limiter;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    /// Pre-selects the enquiry type, e.g. `?type=quote`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Product slug to mention in the subject.
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub sent: Option<String>,
}

/// Form body. `website` is a honeypot that people never fill in.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(flatten)]
    pub draft: MessageDraft,
    #[serde(default)]
    pub website: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub draft: MessageDraft,
    pub kinds: &'static [MessageKind],
    pub errors: ValidationErrors,
    pub sent: bool,
}

#[instrument(skip(query))]
pub async fn form(Query(query): Query<ContactQuery>) -> ContactTemplate {
    let draft = MessageDraft {
        kind: query.kind.unwrap_or_default(),
        subject: query
            .product
            .map(|p| format!("Enquiry about {p}"))
            .unwrap_or_default(),
        ..MessageDraft::default()
    };

    ContactTemplate {
        draft,
        kinds: MessageKind::ALL,
        errors: ValidationErrors::new(),
        sent: query.sent.is_some(),
    }
}

#[instrument(skip(state, form), fields(kind = %form.draft.kind))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    if !form.website.is_empty() {
        tracing::info!("dropping contact submission that filled the honeypot");
        return Ok(Redirect::to("/contact?sent=1").into_response());
    }

    let input = match form.draft.validate() {
        Ok(input) => input,
        Err(errors) => {
            let page = ContactTemplate {
                draft: form.draft,
                kinds: MessageKind::ALL,
                errors,
                sent: false,
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let message = MessageRepository::new(state.pool()).create(&input).await?;
    add_breadcrumb("contact", &format!("message {} stored", message.id));
    tracing::info!(message_id = %message.id, kind = %message.kind, "contact message stored");

    if let Some(notifier) = state.notifier().cloned() {
        tokio::spawn(async move {
            if let Err(e) = notifier.new_message(&message).await {
                tracing::error!(message_id = %message.id, error = %e, "failed to notify sales");
            }
        });
    }

    Ok(Redirect::to("/contact?sent=1").into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(form).merge(post(submit).layer(contact_rate_limiter())),
    )
}
