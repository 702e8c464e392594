//! Contact message inbox handlers.

use askama::Template;
use axum::{
    Router,
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use tracing::instrument;

use kestrel_core::MessageId;
use kestrel_core::catalog::Message;
use kestrel_core::db::MessageRepository;

use crate::{
    error::{AppError, Result},
    filters,
    middleware::RequireAdminAuth,
    state::AppState,
};

use super::{dashboard::AdminUserView, format_timestamp, render};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
        .route("/{id}/delete", post(delete))
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub kind: String,
    pub subject: String,
    pub is_read: bool,
    pub received: String,
}

impl From<&Message> for MessageRow {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.as_i32(),
            name: m.name.clone(),
            email: m.email.to_string(),
            kind: m.kind.label().to_owned(),
            subject: m.subject.clone(),
            is_read: m.is_read,
            received: format_timestamp(m.created_at),
        }
    }
}

#[derive(Template)]
#[template(path = "messages/index.html")]
pub struct MessagesIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub messages: Vec<MessageRow>,
    pub unread: usize,
}

#[derive(Template)]
#[template(path = "messages/show.html")]
pub struct MessageShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub message: MessageRow,
    pub phone: Option<String>,
    pub body: String,
}

/// Inbox, unread first.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let messages = MessageRepository::new(state.pool()).list().await?;
    let messages: Vec<MessageRow> = messages.iter().map(MessageRow::from).collect();

    let template = MessagesIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/messages".to_string(),
        unread: messages.iter().filter(|m| !m.is_read).count(),
        messages,
    };

    Ok(render(&template))
}

/// Show one message and mark it read.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<MessageId>,
) -> Result<Html<String>> {
    let repo = MessageRepository::new(state.pool());
    let message = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("message {id}")))?;

    if !message.is_read {
        repo.mark_read(id).await?;
    }

    let template = MessageShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/messages".to_string(),
        message: MessageRow {
            is_read: true,
            ..MessageRow::from(&message)
        },
        phone: message.phone.clone(),
        body: message.message.clone(),
    };

    Ok(render(&template))
}

#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<MessageId>,
) -> Result<Redirect> {
    MessageRepository::new(state.pool()).delete(id).await?;
    tracing::info!(message_id = %id, "Message deleted");
    Ok(Redirect::to("/messages"))
}
