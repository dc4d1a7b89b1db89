//! Product catalog route handlers: list, detail and delete.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use fabric_core::{Category, Price, ProductId};

use super::dashboard::PageChrome;
use super::render;
use crate::backend::Product;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, push_notice};
use crate::models::Notice;
use crate::state::AppState;

/// Listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Product row view for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub price: String,
    pub discount_price: String,
    pub stock_label: &'static str,
    pub stock_class: &'static str,
    pub image_url: Option<String>,
    pub created_at: String,
}

fn format_price(amount: Option<rust_decimal::Decimal>) -> String {
    amount.map_or_else(|| "-".to_string(), |a| Price::inr(a).display())
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let stock_class = if product.in_stock.is_in_stock() {
            "badge badge-green"
        } else {
            "badge badge-red"
        };
        Self {
            id: product.id.to_string(),
            name: product.product_name.clone(),
            category: product.category.clone(),
            sub_category: product.sub_category.clone(),
            price: format_price(product.price),
            discount_price: format_price(product.discount_price),
            stock_label: product.in_stock.label(),
            stock_class,
            image_url: product.thumbnail().map(str::to_string),
            created_at: product
                .created_at
                .map(|d| d.format("%d %b %Y").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Full product view for the detail page.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub row: ProductView,
    pub description: String,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub paint_meter: String,
    pub shirt_meter: String,
    pub image_urls: Vec<String>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let meter = |m: Option<rust_decimal::Decimal>| m.map(|m| m.to_string()).unwrap_or_default();
        Self {
            row: ProductView::from(product),
            description: product.description.clone(),
            tags: product.tags.clone(),
            features: product.features.clone(),
            paint_meter: meter(product.paint_meter),
            shirt_meter: meter(product.shirt_meter),
            image_urls: product.images.iter().map(|img| img.url.clone()).collect(),
        }
    }
}

/// Apply the search and category filters.
///
/// Search is a case-insensitive substring match over name, category and
/// sub-category. The category filter is an exact, case-insensitive match.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], query: &ProductsQuery) -> Vec<&'a Product> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    products
        .iter()
        .filter(|p| {
            category.is_none_or(|c| p.category.trim().eq_ignore_ascii_case(c))
        })
        .filter(|p| {
            needle.as_deref().is_none_or(|needle| {
                [&p.product_name, &p.category, &p.sub_category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle))
            })
        })
        .collect()
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductView>,
    pub categories: Vec<String>,
    pub search_query: String,
    pub category_filter: String,
}

/// Product detail page template.
#[derive(Template)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: PageChrome,
    pub product: ProductDetailView,
}

/// Products list page handler.
///
/// GET /products
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductsQuery>,
) -> Html<String> {
    let mut chrome = PageChrome::signed_in(&admin, &session, "/products").await;

    let products = match state.backend().list_products().await {
        Ok(products) => filter_products(&products, &query)
            .into_iter()
            .map(ProductView::from)
            .collect(),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            chrome = chrome.with_notice(Notice::error("Failed to load products"));
            Vec::new()
        }
    };

    render(&ProductsIndexTemplate {
        chrome,
        products,
        categories: Category::all().map(|c| c.to_string()).collect(),
        search_query: query.search.unwrap_or_default(),
        category_filter: query.category.unwrap_or_default(),
    })
}

/// Product detail page handler.
///
/// GET /products/{id}
#[instrument(skip(admin, state, session))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let id = ProductId::new(id);
    let product = find_product(&state, &id).await?;

    Ok(render(&ProductShowTemplate {
        chrome: PageChrome::signed_in(&admin, &session, "/products").await,
        product: ProductDetailView::from(&product),
    }))
}

/// Delete a product and return to the list.
///
/// POST /products/{id}/delete
#[instrument(skip(_admin, state, session))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = ProductId::new(id);

    let notice = match state.backend().delete_product(&id).await {
        Ok(response) if response.success => {
            tracing::info!(product_id = %id, "Product deleted");
            Notice::success(response.message_or("Product deleted successfully"))
        }
        Ok(response) => Notice::error(response.message_or("Failed to delete product")),
        Err(e) => {
            tracing::error!(product_id = %id, "Failed to delete product: {e}");
            Notice::error("Failed to delete product")
        }
    };

    push_notice(&session, notice).await?;
    Ok(Redirect::to("/products"))
}

/// Find a listed product by ID. The backend has no single-product endpoint.
pub(crate) async fn find_product(state: &AppState, id: &ProductId) -> Result<Product, AppError> {
    state
        .backend()
        .list_products()
        .await?
        .into_iter()
        .find(|p| &p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
