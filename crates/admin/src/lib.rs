//! Fabric Admin library.
//!
//! Server-rendered administration panel for a fabric store: product catalog
//! management with an image-aware product editor, order review and customer
//! listing. All data lives in the external fabric backend; this crate holds
//! only sessions and open editors in memory.
//!
//! The crate is a library so the router and the editor can be exercised by
//! the integration tests and the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::services::ServeDir;

pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use middleware::create_session_layer;
use state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Build the application router with sessions, upload limit and static
/// assets. Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let body_limit = DefaultBodyLimit::max(state.config().max_upload_bytes);

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(body_limit)
        .layer(session_layer)
        .with_state(state)
}
