//! Router behaviour through `tower::ServiceExt::oneshot`.
//!
//! The backend URL points at a closed local port, so every route that needs
//! the backend sees a transport failure.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use fabric_admin::state::AppState;
use fabric_integration_tests::test_config;
use tower::ServiceExt;

const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9";

fn app() -> Router {
    let state = AppState::new(test_config(UNREACHABLE_BACKEND)).unwrap();
    fabric_admin::app(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_health_is_ok() {
    let response = app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_fails_without_backend() {
    let response = app().oneshot(get("/health/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_dashboard_pages_redirect_to_sign_in() {
    for uri in [
        "/",
        "/products",
        "/orders",
        "/users",
        "/products/editor/6f1c2a9e-5d0b-4a43-9d55-8f0e0f4f5a11",
    ] {
        let response = app().oneshot(get(uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/sign-in"), "{uri}");
    }
}

#[tokio::test]
async fn test_editor_actions_require_sign_in() {
    let response = app()
        .oneshot(post_form("/products/new", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/sign-in"));
}

#[tokio::test]
async fn test_sign_in_page_renders() {
    let response = app().oneshot(get("/sign-in")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("name=\"mobile\""));
    assert!(html.contains("name=\"password\""));
}

#[tokio::test]
async fn test_invalid_sign_in_shows_field_errors() {
    let response = app()
        .oneshot(post_form("/sign-in", "mobile=98765&password=ab"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Mobile number must be exactly 10 digits"));
    assert!(html.contains("Password must be at least 3 characters long"));
}

#[tokio::test]
async fn test_sign_in_with_unreachable_backend_shows_generic_failure() {
    let response = app()
        .oneshot(post_form("/sign-in", "mobile=9876543210&password=secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Something went wrong. Please try again."));
    assert!(html.contains("value=\"9876543210\""));
}

#[tokio::test]
async fn test_sign_up_validation_errors() {
    let response = app()
        .oneshot(post_form(
            "/sign-up",
            "companyName=AB&mobile=9876543210&email=bad&password=abc&confirmPassword=abd",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Company name must be at least 3 characters long"));
    assert!(html.contains("Invalid email address"));
    assert!(html.contains("Passwords must match"));
}
