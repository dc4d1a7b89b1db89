//! Dashboard entry point and the page chrome shared by every template.

use axum::response::Redirect;
use tower_sessions::Session;

use crate::middleware::{RequireAdminAuth, take_notice};
use crate::models::{CurrentAdmin, Notice};

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub mobile: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            mobile: admin.mobile.clone(),
        }
    }
}

/// Notice view for templates.
#[derive(Debug, Clone)]
pub struct NoticeView {
    pub message: String,
    pub css_class: &'static str,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        let css_class = if notice.is_error() {
            "notice notice-error"
        } else {
            "notice notice-success"
        };
        Self {
            message: notice.message,
            css_class,
        }
    }
}

/// Layout data rendered by `base.html`.
#[derive(Debug, Clone)]
pub struct PageChrome {
    pub admin_user: Option<AdminUserView>,
    pub current_path: String,
    pub notice: Option<NoticeView>,
}

impl PageChrome {
    /// Chrome for a signed-in page, consuming the pending notice.
    pub async fn signed_in(admin: &CurrentAdmin, session: &Session, current_path: &str) -> Self {
        Self {
            admin_user: Some(AdminUserView::from(admin)),
            current_path: current_path.to_string(),
            notice: take_notice(session).await.map(NoticeView::from),
        }
    }

    /// Chrome for the sign-in and sign-up pages.
    pub async fn anonymous(session: &Session, current_path: &str) -> Self {
        Self {
            admin_user: None,
            current_path: current_path.to_string(),
            notice: take_notice(session).await.map(NoticeView::from),
        }
    }

    /// Replace the notice with one produced while handling this request.
    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(NoticeView::from(notice));
        self
    }

    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        self.current_path.starts_with(prefix)
    }
}

/// Dashboard root; the product list is the landing page.
///
/// GET /
pub async fn index(RequireAdminAuth(_admin): RequireAdminAuth) -> Redirect {
    Redirect::to("/products")
}
