//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state and one-shot notices.

use serde::{Deserialize, Serialize};

use fabric_core::ClientId;

use crate::backend::LoggedInClient;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in client account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend client account ID.
    pub id: ClientId,
    /// Display name (company name, falling back to the mobile number).
    pub name: String,
    /// Mobile number used to sign in.
    pub mobile: String,
    /// Email address, when the backend returned one.
    pub email: Option<String>,
}

impl CurrentAdmin {
    /// Build the session identity from a login response.
    ///
    /// `mobile` is the number the admin signed in with; it backs up the
    /// identity fields the backend may omit.
    #[must_use]
    pub fn from_login(client: LoggedInClient, mobile: &str) -> Self {
        let mobile = client.mobile.unwrap_or_else(|| mobile.to_string());
        let id = if client.id.as_str().is_empty() {
            ClientId::new(mobile.clone())
        } else {
            client.id
        };
        let name = client
            .company_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| mobile.clone());

        Self {
            id,
            name,
            mobile,
            email: client.email,
        }
    }
}

/// Tone of a one-shot notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NoticeKind::Error)
    }
}

/// Session keys for admin data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the pending one-shot notice.
    pub const NOTICE: &str = "notice";
}
