//! HTTP middleware for admin: session layer and authentication extractors.

pub mod auth;
pub mod session;

pub use auth::{
    RequireAdminAuth, clear_current_admin, push_notice, set_current_admin, take_notice,
};
pub use session::create_session_layer;
