//! Integration tests for the fabric admin.
//!
//! # Running Tests
//!
//! ```bash
//! # Editor scenarios and router tests (no backend needed)
//! cargo test -p fabric-integration-tests
//!
//! # Live backend smoke tests
//! BACKEND_URL=http://localhost:5000 cargo test -p fabric-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `product_editor` - Editor scenarios through a recording [`FakeProductApi`]
//! - `admin_routes` - Router behaviour through `tower::ServiceExt::oneshot`
//! - `live_backend` - Ignored tests against a running backend

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use fabric_admin::backend::{ApiResponse, BackendError, Product};
use fabric_admin::config::{AdminConfig, BackendConfig};
use fabric_admin::editor::{
    CloseReason, CreateProductRequest, LocalFile, OnClose, ProductApi, ProductRequest,
    UpdateProductRequest,
};
use serde_json::json;
use url::Url;

/// What the fake API answers with for the next call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `{success: true, message}`
    Accept(String),
    /// `{success: false, message}`
    Reject(String),
    /// A server error status.
    Fail(u16),
}

/// Records every request and answers from a script (accepting by default).
#[derive(Debug, Default)]
pub struct FakeProductApi {
    requests: Mutex<Vec<ProductRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl FakeProductApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for the following calls.
    #[must_use]
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            requests: Mutex::default(),
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ProductRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn answer(&self, request: ProductRequest) -> Result<ApiResponse, BackendError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Reply::Accept(String::new()));

        match reply {
            Reply::Accept(message) => Ok(ApiResponse {
                success: true,
                message,
                data: None,
            }),
            Reply::Reject(message) => Ok(ApiResponse {
                success: false,
                message,
                data: None,
            }),
            Reply::Fail(status) => Err(BackendError::Status {
                status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

impl ProductApi for FakeProductApi {
    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<ApiResponse, BackendError> {
        self.answer(ProductRequest::Create(request.clone()))
    }

    async fn update_product(
        &self,
        request: &UpdateProductRequest,
    ) -> Result<ApiResponse, BackendError> {
        self.answer(ProductRequest::Update(request.clone()))
    }
}

/// Collects close signals so tests can assert they fire exactly once.
#[derive(Debug, Clone, Default)]
pub struct CloseLog(Arc<Mutex<Vec<CloseReason>>>);

impl CloseLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A close callback that appends to this log.
    #[must_use]
    pub fn callback(&self) -> OnClose {
        let log = Arc::clone(&self.0);
        Box::new(move |reason| {
            log.lock().unwrap_or_else(PoisonError::into_inner).push(reason);
        })
    }

    pub fn reasons(&self) -> Vec<CloseReason> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// A small JPEG-typed file.
#[must_use]
pub fn jpeg(name: &str) -> LocalFile {
    LocalFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

/// `count` JPEG files named `photo-<n>.jpg`.
#[must_use]
pub fn jpegs(count: usize) -> Vec<LocalFile> {
    (1..=count).map(|n| jpeg(&format!("photo-{n}.jpg"))).collect()
}

/// A listed silk product with `image_count` stored images named `img-<n>.jpg`.
///
/// # Panics
///
/// Panics if the fixture stops deserializing into [`Product`].
#[must_use]
pub fn silk_product(image_count: usize) -> Product {
    let images: Vec<_> = (1..=image_count)
        .map(|n| json!({"filename": format!("img-{n}.jpg"), "url": format!("http://cdn.test/img-{n}.jpg")}))
        .collect();
    serde_json::from_value(json!({
        "product_id": "p-42",
        "productName": "Banarasi Brocade",
        "category": "Silk Fabric",
        "subCategory": "Banarasi Silk",
        "inStock": "Yes",
        "price": "2400",
        "discountPrice": "2100",
        "description": "Zari woven brocade",
        "tags": ["Best Seller"],
        "features": ["Pure silk"],
        "shirtMeter": "2.5",
        "images": images
    }))
    .unwrap_or_else(|e| panic!("fixture product: {e}"))
}

/// Configuration pointing at `backend_url`, with no TLS and short timeouts.
///
/// # Panics
///
/// Panics if `backend_url` is not a valid URL.
#[must_use]
pub fn test_config(backend_url: &str) -> AdminConfig {
    let base_url =
        Url::parse(backend_url).unwrap_or_else(|e| panic!("invalid backend url {backend_url}: {e}"));
    AdminConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3001".to_string(),
        backend: BackendConfig {
            base_url,
            timeout: Duration::from_secs(2),
        },
        editor_idle: Duration::from_secs(60),
        max_upload_bytes: 5 * 1024 * 1024,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    }
}
