//! Authentication route handlers for admin.
//!
//! Sign-in with mobile number and password, self-service sign-up of a client
//! account, and logout. The backend owns the accounts; these handlers only
//! validate input, forward it and keep the session in step.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use fabric_core::{Email, MobileNumber};

use super::dashboard::PageChrome;
use super::render;
use crate::backend::{LoggedInClient, SignInRequest, SignUpRequest};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_admin, push_notice, set_current_admin};
use crate::models::{CurrentAdmin, Notice, session_keys};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 3;
const MIN_COMPANY_NAME_LEN: usize = 3;
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(sign_in_page).post(sign_in))
        .route("/sign-up", get(sign_up_page).post(sign_up))
        .route("/logout", post(logout))
}

// =============================================================================
// Forms
// =============================================================================

/// Posted sign-in form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub password: String,
}

/// Field errors for the sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInErrors {
    pub mobile: Option<String>,
    pub password: Option<String>,
}

impl SignInForm {
    /// Validate into a login request.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when the input is invalid.
    pub fn validate(&self) -> Result<SignInRequest, SignInErrors> {
        let mobile = MobileNumber::parse(&self.mobile);
        let password = validate_password(&self.password);

        match (mobile, password) {
            (Ok(mobile), Ok(())) => Ok(SignInRequest {
                mobile: mobile.as_str().to_string(),
                password: self.password.clone(),
            }),
            (mobile, password) => Err(SignInErrors {
                mobile: mobile.err().map(|e| e.to_string()),
                password: password.err(),
            }),
        }
    }
}

/// Posted sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpForm {
    pub company_name: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Field errors for the sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpErrors {
    pub company_name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl SignUpErrors {
    fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.mobile.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}

impl SignUpForm {
    /// Validate into a registration request.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when the input is invalid.
    pub fn validate(&self) -> Result<SignUpRequest, SignUpErrors> {
        let company_name = self.company_name.trim();
        let mut errors = SignUpErrors::default();

        if company_name.is_empty() {
            errors.company_name = Some("Company name is required".to_string());
        } else if company_name.chars().count() < MIN_COMPANY_NAME_LEN {
            errors.company_name = Some(format!(
                "Company name must be at least {MIN_COMPANY_NAME_LEN} characters long"
            ));
        }

        let mobile = MobileNumber::parse(&self.mobile)
            .map_err(|e| errors.mobile = Some(e.to_string()))
            .ok();

        let email = Email::parse(&self.email)
            .map_err(|e| errors.email = Some(e.to_string()))
            .ok();

        errors.password = validate_password(&self.password).err();

        if self.confirm_password.is_empty() {
            errors.confirm_password = Some("Confirm password is required".to_string());
        } else if self.confirm_password != self.password {
            errors.confirm_password = Some("Passwords must match".to_string());
        }

        match (mobile, email) {
            (Some(mobile), Some(email)) if errors.is_empty() => Ok(SignUpRequest {
                company_name: company_name.to_string(),
                mobile: mobile.as_str().to_string(),
                email: email.into_inner(),
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}

fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        Err("Password is required".to_string())
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ))
    } else {
        Ok(())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template)]
#[template(path = "auth/sign_in.html")]
pub struct SignInTemplate {
    pub chrome: PageChrome,
    pub mobile: String,
    pub errors: SignInErrors,
}

/// Sign-up page template.
#[derive(Template)]
#[template(path = "auth/sign_up.html")]
pub struct SignUpTemplate {
    pub chrome: PageChrome,
    pub form: SignUpForm,
    pub errors: SignUpErrors,
}

// =============================================================================
// Handlers
// =============================================================================

async fn is_signed_in(session: &Session) -> bool {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .is_some()
}

/// Render the sign-in page.
///
/// GET /sign-in
async fn sign_in_page(session: Session) -> Response {
    if is_signed_in(&session).await {
        return Redirect::to("/").into_response();
    }
    let template = SignInTemplate {
        chrome: PageChrome::anonymous(&session, "/sign-in").await,
        mobile: String::new(),
        errors: SignInErrors::default(),
    };
    render(&template).into_response()
}

/// Sign in against the backend.
///
/// POST /sign-in
#[instrument(skip(state, session, form))]
async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Response {
    let chrome = PageChrome::anonymous(&session, "/sign-in").await;
    let rerender = |chrome: PageChrome, errors: SignInErrors| -> Response {
        render(&SignInTemplate {
            chrome,
            mobile: form.mobile.clone(),
            errors,
        })
        .into_response()
    };

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => return rerender(chrome, errors),
    };

    match state.backend().login_client(&request).await {
        Ok(response) if response.success => {
            let client: LoggedInClient = response
                .data
                .clone()
                .and_then(|data| serde_json::from_value(data).ok())
                .unwrap_or_default();
            let admin = CurrentAdmin::from_login(client, &request.mobile);

            if let Err(e) = set_current_admin(&session, &admin).await {
                warn!(error = %e, "Failed to store admin in session");
                return rerender(chrome.with_notice(Notice::error(GENERIC_FAILURE)), SignInErrors::default());
            }
            set_sentry_user(admin.id.as_str(), admin.email.as_deref());
            if let Err(e) = push_notice(&session, Notice::success(response.message_or("Login successful"))).await {
                warn!(error = %e, "Failed to store notice");
            }
            tracing::info!(client_id = %admin.id, "Admin signed in");
            Redirect::to("/").into_response()
        }
        Ok(response) => {
            let message = response.message_or("Invalid mobile number or password");
            rerender(chrome.with_notice(Notice::error(message)), SignInErrors::default())
        }
        Err(e) => {
            warn!(error = %e, "Login request failed");
            rerender(chrome.with_notice(Notice::error(GENERIC_FAILURE)), SignInErrors::default())
        }
    }
}

/// Render the sign-up page.
///
/// GET /sign-up
async fn sign_up_page(session: Session) -> Html<String> {
    render(&SignUpTemplate {
        chrome: PageChrome::anonymous(&session, "/sign-up").await,
        form: SignUpForm::default(),
        errors: SignUpErrors::default(),
    })
}

/// Register a client account.
///
/// POST /sign-up
#[instrument(skip(state, session, form))]
async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Response {
    let chrome = PageChrome::anonymous(&session, "/sign-up").await;

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            return render(&SignUpTemplate {
                chrome,
                form,
                errors,
            })
            .into_response();
        }
    };

    let notice = match state.backend().register_client(&request).await {
        Ok(response) if response.success => {
            let message = response.message_or("Account created. Please sign in.");
            if let Err(e) = push_notice(&session, Notice::success(message)).await {
                warn!(error = %e, "Failed to store notice");
            }
            return Redirect::to("/sign-in").into_response();
        }
        Ok(response) => Notice::error(response.message_or("Sign up failed")),
        Err(e) => {
            warn!(error = %e, "Registration request failed");
            Notice::error(GENERIC_FAILURE)
        }
    };

    render(&SignUpTemplate {
        chrome: chrome.with_notice(notice),
        form,
        errors: SignUpErrors::default(),
    })
    .into_response()
}

/// Logout and clear session.
///
/// POST /logout
async fn logout(session: Session) -> impl IntoResponse {
    let _ = clear_current_admin(&session).await;
    clear_sentry_user();
    Redirect::to("/sign-in")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign_up_form() -> SignUpForm {
        SignUpForm {
            company_name: "Weave House".to_string(),
            mobile: "9876543210".to_string(),
            email: "orders@weave.example".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
        }
    }

    #[test]
    fn test_sign_in_valid() {
        let form = SignInForm {
            mobile: " 9876543210 ".to_string(),
            password: "abc".to_string(),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.mobile, "9876543210");
    }

    #[test]
    fn test_sign_in_errors() {
        let form = SignInForm {
            mobile: "98765".to_string(),
            password: "ab".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.mobile.as_deref(),
            Some("Mobile number must be exactly 10 digits")
        );
        assert_eq!(
            errors.password.as_deref(),
            Some("Password must be at least 3 characters long")
        );
    }

    #[test]
    fn test_sign_in_missing_fields() {
        let errors = SignInForm::default().validate().unwrap_err();
        assert_eq!(errors.mobile.as_deref(), Some("Mobile number is required"));
        assert_eq!(errors.password.as_deref(), Some("Password is required"));
    }

    #[test]
    fn test_sign_up_valid() {
        let request = sign_up_form().validate().unwrap();
        assert_eq!(request.company_name, "Weave House");
        assert_eq!(request.email, "orders@weave.example");
    }

    #[test]
    fn test_sign_up_password_mismatch() {
        let form = SignUpForm {
            confirm_password: "other".to_string(),
            ..sign_up_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.confirm_password.as_deref(), Some("Passwords must match"));
        assert!(errors.mobile.is_none());
    }

    #[test]
    fn test_sign_up_field_rules() {
        let form = SignUpForm {
            company_name: "AB".to_string(),
            email: "not-an-email".to_string(),
            ..sign_up_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.company_name.as_deref(),
            Some("Company name must be at least 3 characters long")
        );
        assert_eq!(errors.email.as_deref(), Some("Invalid email address"));
    }
}
