//! Orders route handlers: filtered list and order detail.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use strum::IntoEnumIterator;
use tower_sessions::Session;
use tracing::instrument;

use fabric_core::{OrderId, OrderStatus, Price};

use super::dashboard::PageChrome;
use super::render;
use crate::backend::{Order, OrderItem};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::Notice;
use crate::state::AppState;

/// Listing filters. Dates are `YYYY-MM-DD` as posted by date inputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl OrdersQuery {
    /// The inclusive date range, when both ends are given and valid.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let parse = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        };
        Some((parse(&self.start_date)?, parse(&self.end_date)?))
    }

    fn status_filter(&self) -> Option<OrderStatus> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}

/// Apply the search, status and date filters.
#[must_use]
pub fn filter_orders<'a>(orders: &'a [Order], query: &OrdersQuery) -> Vec<&'a Order> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let status = query.status_filter();
    let range = query.date_range();

    orders
        .iter()
        .filter(|o| status.is_none_or(|s| o.status == Some(s)))
        .filter(|o| {
            range.is_none_or(|(start, end)| {
                o.created_at
                    .map(|at| at.date_naive())
                    .is_some_and(|day| start <= day && day <= end)
            })
        })
        .filter(|o| {
            needle.as_deref().is_none_or(|needle| {
                o.shipping_form.full_name().to_lowercase().contains(needle)
                    || o.shipping_form.email.to_lowercase().contains(needle)
            })
        })
        .collect()
}

fn money(amount: Option<Decimal>) -> String {
    Price::inr(amount.unwrap_or_default()).display()
}

/// Order row view for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub customer_name: String,
    pub email: String,
    pub item_count: usize,
    pub total: String,
    pub status: String,
    pub status_color: &'static str,
    pub created_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let status = order.status.unwrap_or_default();
        Self {
            id: order.id.to_string(),
            customer_name: order.shipping_form.full_name(),
            email: order.shipping_form.email.clone(),
            item_count: order.order_items.len(),
            total: money(order.total),
            status: status.to_string(),
            status_color: status.badge_color(),
            created_at: order
                .created_at
                .map(|d| d.format("%d %b %Y").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Purchased line for the detail page.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            image_url: item.images.first().map(|img| img.url.clone()),
            quantity: item.quantity,
            unit_price: money(item.price),
            line_total: item.line_total().display(),
        }
    }
}

/// Full order view for the detail page.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub row: OrderView,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub lines: Vec<OrderLineView>,
    pub subtotal: String,
    pub discount: String,
    pub tax: String,
    pub total: String,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        let shipping = &order.shipping_form;
        Self {
            row: OrderView::from(order),
            phone: shipping.phone.clone(),
            address: shipping.address.clone(),
            city: shipping.city.clone(),
            state: shipping.state.clone(),
            zip_code: shipping.zip_code.clone(),
            lines: order.order_items.iter().map(OrderLineView::from).collect(),
            subtotal: money(order.subtotal),
            discount: money(order.discount),
            tax: money(order.tax),
            total: money(order.total),
        }
    }
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub chrome: PageChrome,
    pub orders: Vec<OrderView>,
    pub statuses: Vec<String>,
    pub search_query: String,
    pub status_filter: String,
    pub start_date: String,
    pub end_date: String,
}

/// Order detail page template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub chrome: PageChrome,
    pub order: OrderDetailView,
}

/// Orders list page handler.
///
/// GET /orders
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Html<String> {
    let mut chrome = PageChrome::signed_in(&admin, &session, "/orders").await;

    let orders = match state.backend().list_orders().await {
        Ok(orders) => filter_orders(&orders, &query)
            .into_iter()
            .map(OrderView::from)
            .collect(),
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            chrome = chrome.with_notice(Notice::error("Failed to load orders"));
            Vec::new()
        }
    };

    render(&OrdersIndexTemplate {
        chrome,
        orders,
        statuses: OrderStatus::iter().map(|s| s.to_string()).collect(),
        search_query: query.search.unwrap_or_default(),
        status_filter: query.status.unwrap_or_default(),
        start_date: query.start_date.unwrap_or_default(),
        end_date: query.end_date.unwrap_or_default(),
    })
}

/// Order detail page handler.
///
/// GET /orders/{id}
#[instrument(skip(admin, state, session))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = OrderId::new(id);
    let order = state
        .backend()
        .list_orders()
        .await?
        .into_iter()
        .find(|o| o.id == id)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(render(&OrderShowTemplate {
        chrome: PageChrome::signed_in(&admin, &session, "/orders").await,
        order: OrderDetailView::from(&order),
    }))
}
