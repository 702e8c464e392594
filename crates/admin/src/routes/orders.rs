//! Order management route handlers.
//!
//! Orders are entered by the sales team. The total is always recomputed from
//! the item lines on save.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use kestrel_core::catalog::{Order, OrderDraft, ValidationErrors};
use kestrel_core::db::OrderRepository;
use kestrel_core::{OrderId, OrderStatus};

use crate::{
    error::{AppError, Result},
    filters,
    forms::{OrderForm, OrderStatusForm},
    middleware::RequireAdminAuth,
    state::AppState,
};

use super::{SelectOption, dashboard::AdminUserView, format_timestamp, render, render_invalid};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/new", get(new))
        .route("/{id}", get(show).post(update))
        .route("/{id}/status", post(update_status))
        .route("/{id}/delete", post(delete))
}

/// `?status=` filter on the listing.
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: String,
}

impl OrderFilter {
    fn status(&self) -> Result<Option<OrderStatus>> {
        let raw = self.status.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|e: kestrel_core::ParseStatusError| AppError::BadRequest(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: i32,
    pub customer_name: String,
    pub items: usize,
    pub total: String,
    pub status: String,
    pub is_open: bool,
    pub created: String,
}

#[derive(Debug, Clone)]
pub struct ItemRow {
    pub product: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub orders: Vec<OrderRow>,
    /// Filter tabs, the empty value meaning "all".
    pub filters: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "orders/form.html")]
pub struct OrderFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub form: OrderForm,
    pub errors: ValidationErrors,
    pub statuses: Vec<SelectOption>,
}

/// Order detail page, carrying both the full edit form and the quick
/// status form.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub order_id: i32,
    pub status_label: String,
    pub total: String,
    pub created: String,
    pub updated: String,
    pub items: Vec<ItemRow>,
    pub form: OrderForm,
    pub errors: ValidationErrors,
    pub statuses: Vec<SelectOption>,
}

fn status_options(current: &str) -> Vec<SelectOption> {
    let current = if current.trim().is_empty() {
        OrderStatus::default().as_str()
    } else {
        current
    };
    OrderStatus::ALL
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), current))
        .collect()
}

fn filter_options(current: Option<OrderStatus>) -> Vec<SelectOption> {
    let current = current.map_or("", OrderStatus::as_str);
    std::iter::once(SelectOption::new("", "All", current))
        .chain(
            OrderStatus::ALL
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.label(), current)),
        )
        .collect()
}

fn show_page(
    admin: AdminUserView,
    order: &Order,
    form: OrderForm,
    errors: ValidationErrors,
) -> OrderShowTemplate {
    OrderShowTemplate {
        admin_user: admin,
        current_path: "/orders".to_string(),
        order_id: order.id.as_i32(),
        status_label: order.status.label().to_owned(),
        total: order.total_amount.to_string(),
        created: format_timestamp(order.created_at),
        updated: format_timestamp(order.updated_at),
        items: order
            .items
            .iter()
            .map(|item| ItemRow {
                product: item.product.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price.to_string(),
                line_total: item
                    .line_total()
                    .map_or_else(|| "overflow".to_string(), |total| total.to_string()),
            })
            .collect(),
        statuses: status_options(&form.status),
        form,
        errors,
    }
}

/// Orders list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Html<String>> {
    let status = filter.status()?;
    let orders = OrderRepository::new(state.pool()).list(status).await?;

    let template = OrdersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        orders: orders
            .iter()
            .map(|o| OrderRow {
                id: o.id.as_i32(),
                customer_name: o.customer_name.clone(),
                items: o.items.len(),
                total: o.total_amount.to_string(),
                status: o.status.label().to_owned(),
                is_open: o.status.is_open(),
                created: format_timestamp(o.created_at),
            })
            .collect(),
        filters: filter_options(status),
    };

    Ok(render(&template))
}

#[instrument(skip(admin))]
pub async fn new(RequireAdminAuth(admin): RequireAdminAuth) -> Html<String> {
    render(&OrderFormTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        statuses: status_options(""),
        form: OrderForm::default(),
        errors: ValidationErrors::new(),
    })
}

/// Create order handler.
#[instrument(skip(admin, state, form), fields(customer = %form.customer_name))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    match form.validate() {
        Ok(input) => {
            let order = OrderRepository::new(state.pool()).create(&input).await?;
            tracing::info!(order_id = %order.id, total = %order.total_amount, "Order created");
            Ok(Redirect::to(&format!("/orders/{}", order.id)).into_response())
        }
        Err(errors) => Ok(render_invalid(&OrderFormTemplate {
            admin_user: AdminUserView::from(&admin),
            current_path: "/orders".to_string(),
            statuses: status_options(&form.status),
            form,
            errors,
        })),
    }
}

/// Order detail page handler.
#[instrument(skip(admin, state))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Html<String>> {
    let order = find(&state, id).await?;
    let form = OrderForm::from(&OrderDraft::from(&order));
    Ok(render(&show_page(
        AdminUserView::from(&admin),
        &order,
        form,
        ValidationErrors::new(),
    )))
}

/// Update order handler.
#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderForm>,
) -> Result<Response> {
    let order = find(&state, id).await?;

    match form.validate() {
        Ok(input) => {
            let updated = OrderRepository::new(state.pool()).update(id, &input).await?;
            tracing::info!(order_id = %id, total = %updated.total_amount, "Order updated");
            Ok(Redirect::to(&format!("/orders/{id}")).into_response())
        }
        Err(errors) => Ok(render_invalid(&show_page(
            AdminUserView::from(&admin),
            &order,
            form,
            errors,
        ))),
    }
}

/// Change only the status of an order.
#[instrument(skip(_admin, state, form), fields(status = %form.status))]
pub async fn update_status(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(form): Form<OrderStatusForm>,
) -> Result<Redirect> {
    let status: OrderStatus = form
        .status
        .trim()
        .parse()
        .map_err(|e: kestrel_core::ParseStatusError| AppError::BadRequest(e.to_string()))?;

    OrderRepository::new(state.pool())
        .update_status(id, status)
        .await?;
    tracing::info!(order_id = %id, status = %status, "Order status changed");
    Ok(Redirect::to(&format!("/orders/{id}")))
}

#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    OrderRepository::new(state.pool()).delete(id).await?;
    tracing::info!(order_id = %id, "Order deleted");
    Ok(Redirect::to("/orders"))
}

async fn find(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_blank_means_all() {
        let filter = OrderFilter::default();
        assert_eq!(filter.status().unwrap(), None);
    }

    #[test]
    fn test_filter_parses_known_status() {
        let filter = OrderFilter {
            status: "shipped".to_string(),
        };
        assert_eq!(filter.status().unwrap(), Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_filter_rejects_unknown_status() {
        let filter = OrderFilter {
            status: "lost".to_string(),
        };
        assert!(matches!(filter.status(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_status_options_default_to_pending() {
        let options = status_options("");
        assert_eq!(options.len(), OrderStatus::ALL.len());
        assert!(options[0].selected);
        assert_eq!(options[0].value, "pending");
    }

    #[test]
    fn test_filter_options_lead_with_all() {
        let options = filter_options(Some(OrderStatus::Delivered));
        assert_eq!(options[0].label, "All");
        assert!(!options[0].selected);
        assert!(options.iter().any(|o| o.selected && o.value == "delivered"));
    }
}
