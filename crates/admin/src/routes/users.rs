//! Users (storefront customers) list route handler.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use fabric_core::CustomerStatus;

use super::dashboard::PageChrome;
use super::render;
use crate::backend::Customer;
use crate::middleware::RequireAdminAuth;
use crate::models::Notice;
use crate::state::AppState;

/// Listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

/// Customer row view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub status_class: &'static str,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        let status = customer.status();
        let status_class = match status {
            CustomerStatus::Active => "badge badge-green",
            CustomerStatus::Offline => "badge badge-gray",
        };
        Self {
            id: customer.id.to_string(),
            name: customer.full_name(),
            email: customer.email.clone(),
            status: status.to_string(),
            status_class,
        }
    }
}

/// Apply the search and status filters.
///
/// Search is a case-insensitive substring match over "first last" and the
/// email. An unrecognised status shows everyone.
#[must_use]
pub fn filter_customers<'a>(customers: &'a [Customer], query: &UsersQuery) -> Vec<&'a Customer> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let status: Option<CustomerStatus> = query
        .status
        .as_deref()
        .and_then(|s| s.trim().parse().ok());

    customers
        .iter()
        .filter(|c| status.is_none_or(|s| c.status() == s))
        .filter(|c| {
            needle.as_deref().is_none_or(|needle| {
                c.full_name().to_lowercase().contains(needle)
                    || c.email.to_lowercase().contains(needle)
            })
        })
        .collect()
}

/// Users list page template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub chrome: PageChrome,
    pub customers: Vec<CustomerView>,
    pub search_query: String,
    pub status_filter: String,
}

/// Users list page handler.
///
/// GET /users
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<UsersQuery>,
) -> Html<String> {
    let mut chrome = PageChrome::signed_in(&admin, &session, "/users").await;

    let customers = match state.backend().list_customers().await {
        Ok(customers) => filter_customers(&customers, &query)
            .into_iter()
            .map(CustomerView::from)
            .collect(),
        Err(e) => {
            tracing::error!("Failed to fetch customers: {e}");
            chrome = chrome.with_notice(Notice::error("Failed to load users"));
            Vec::new()
        }
    };

    render(&UsersIndexTemplate {
        chrome,
        customers,
        search_query: query.search.unwrap_or_default(),
        status_filter: query.status.unwrap_or_default(),
    })
}
