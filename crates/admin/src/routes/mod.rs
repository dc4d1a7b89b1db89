//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness check
//! GET  /health/ready                             - Backend readiness check
//!
//! # Auth (mobile number + password, accounts held by the backend)
//! GET  /sign-in                                  - Sign-in page
//! POST /sign-in                                  - Sign in
//! GET  /sign-up                                  - Sign-up page
//! POST /sign-up                                  - Register a client account
//! POST /logout                                   - Logout
//!
//! # Dashboard
//! GET  /                                         - Redirects to /products
//!
//! # Products
//! GET  /products                                 - Product listing
//! POST /products/new                             - Open a create editor
//! GET  /products/{id}                            - Product detail
//! POST /products/{id}/edit                       - Open an edit editor
//! POST /products/{id}/delete                     - Delete product
//!
//! # Product editor
//! GET  /products/editor/{eid}                    - Editor page
//! POST /products/editor/{eid}/fields             - Apply field form
//! POST /products/editor/{eid}/images             - Stage image files
//! POST /products/editor/{eid}/images/{i}/remove  - Remove image
//! POST /products/editor/{eid}/features           - Add feature
//! POST /products/editor/{eid}/features/{i}/remove - Remove feature
//! POST /products/editor/{eid}/submit             - Save product
//! POST /products/editor/{eid}/cancel             - Close without saving
//! GET  /products/editor/{eid}/preview/{token}    - Staged image preview
//!
//! # Orders
//! GET  /orders                                   - Order listing
//! GET  /orders/{id}                              - Order detail
//!
//! # Users
//! GET  /users                                    - Customer listing
//! ```

use askama::Template;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};

use crate::state::AppState;

pub mod auth;
pub mod dashboard;
pub mod editor;
pub mod orders;
pub mod products;
pub mod users;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Auth
        .merge(auth::router())
        // Dashboard
        .route("/", get(dashboard::index))
        // Products
        .route("/products", get(products::index))
        .route("/products/new", post(editor::open_create))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/edit", post(editor::open_edit))
        .route("/products/{id}/delete", post(products::delete))
        // Product editor
        .route("/products/editor/{editor_id}", get(editor::show))
        .route("/products/editor/{editor_id}/fields", post(editor::update_fields))
        .route("/products/editor/{editor_id}/images", post(editor::add_images))
        .route(
            "/products/editor/{editor_id}/images/{index}/remove",
            post(editor::remove_image),
        )
        .route("/products/editor/{editor_id}/features", post(editor::add_feature))
        .route(
            "/products/editor/{editor_id}/features/{index}/remove",
            post(editor::remove_feature),
        )
        .route("/products/editor/{editor_id}/submit", post(editor::submit))
        .route("/products/editor/{editor_id}/cancel", post(editor::cancel))
        .route(
            "/products/editor/{editor_id}/preview/{token}",
            get(editor::preview),
        )
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        // Users
        .route("/users", get(users::index))
}

/// Render a template, logging failures instead of surfacing them.
pub(crate) fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend product listing fails.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backend().list_products().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Backend readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
