//! Domain models for admin.

pub mod session;

pub use session::{CurrentAdmin, Notice, NoticeKind, keys as session_keys};
