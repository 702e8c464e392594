//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use kestrel_core::PostStatus;
use kestrel_core::catalog::Message;
use kestrel_core::db::{
    BlogPostRepository, CategoryRepository, CertificationRepository, MessageRepository,
    OrderRepository, ProductRepository, UserRepository,
};

use crate::{
    error::Result, filters, middleware::RequireAdminAuth, models::CurrentAdmin, state::AppState,
};

use super::{format_timestamp, render};

/// Unread messages shown on the dashboard.
const RECENT_MESSAGES: usize = 5;

/// Logged-in user as shown in the page header.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
        }
    }
}

/// Content counts.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub products: i64,
    pub posts: i64,
    pub published_posts: i64,
    pub categories: i64,
    pub certifications: i64,
    pub unread_messages: i64,
    pub admins: i64,
}

/// One unread message teaser.
#[derive(Debug, Clone)]
pub struct MessageTeaser {
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub subject: String,
    pub received: String,
}

impl From<&Message> for MessageTeaser {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.as_i32(),
            name: message.name.clone(),
            kind: message.kind.label().to_owned(),
            subject: message.subject.clone(),
            received: format_timestamp(message.created_at),
        }
    }
}

/// Order count for one status, linking to the filtered order list.
#[derive(Debug, Clone)]
pub struct StatusCount {
    pub status: String,
    pub label: String,
    pub count: i64,
    pub is_open: bool,
}

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub metrics: DashboardMetrics,
    pub unread: Vec<MessageTeaser>,
    pub orders_by_status: Vec<StatusCount>,
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip(admin, state))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let pool = state.pool();
    let posts = BlogPostRepository::new(pool);
    let messages = MessageRepository::new(pool);
    let products_repo = ProductRepository::new(pool);
    let categories_repo = CategoryRepository::new(pool);
    let certifications_repo = CertificationRepository::new(pool);
    let users_repo = UserRepository::new(pool);
    let orders_repo = OrderRepository::new(pool);

    let (
        products,
        all_posts,
        published_posts,
        categories,
        certifications,
        unread_count,
        admins,
        inbox,
        by_status,
    ) = tokio::try_join!(
        products_repo.count(),
        posts.count(None),
        posts.count(Some(PostStatus::Published)),
        categories_repo.count(),
        certifications_repo.count(),
        messages.count_unread(),
        users_repo.count_admins(),
        messages.list(),
        orders_repo.count_by_status(),
    )?;

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/".to_string(),
        metrics: DashboardMetrics {
            products,
            posts: all_posts,
            published_posts,
            categories,
            certifications,
            unread_messages: unread_count,
            admins,
        },
        unread: inbox
            .iter()
            .filter(|m| !m.is_read)
            .take(RECENT_MESSAGES)
            .map(MessageTeaser::from)
            .collect(),
        orders_by_status: by_status
            .into_iter()
            .map(|(status, count)| StatusCount {
                status: status.as_str().to_owned(),
                label: status.label().to_owned(),
                count,
                is_open: status.is_open(),
            })
            .collect(),
    };

    Ok(render(&template))
}
