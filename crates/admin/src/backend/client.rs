//! HTTP client for the fabric backend REST API.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use fabric_core::ProductId;

use super::error::BackendError;
use super::types::{
    ApiResponse, Customer, Order, OrdersEnvelope, Product, SignInRequest, SignUpRequest,
};
use crate::config::BackendConfig;
use crate::editor::{CreateProductRequest, ProductApi, ProductRequest, UpdateProductRequest};

/// Multipart field name for uploaded image parts.
const IMAGES_FIELD: &str = "images";

/// Client for the fabric backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments under the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::CannotBeABase(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.endpoint(&["api", "products"])?;
        let response = self.inner.client.get(url).send().await?;
        let products: Vec<Product> = decode(response).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Delete a product by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<ApiResponse, BackendError> {
        let url = self.endpoint(&["api", "products", id.as_str()])?;
        let response = self.inner.client.delete(url).send().await?;
        decode_api_response(response).await
    }

    /// Send a create or update request as a multipart form.
    async fn send_product_form(
        &self,
        segments: &[&str],
        request: &ProductRequest,
    ) -> Result<ApiResponse, BackendError> {
        let url = self.endpoint(segments)?;
        let form = multipart_form(request)?;
        let response = self.inner.client.post(url).multipart(form).send().await?;
        decode_api_response(response).await
    }

    // =========================================================================
    // Orders & customers
    // =========================================================================

    /// List every order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
        let url = self.endpoint(&["api", "order", "getAllorder"])?;
        let response = self.inner.client.get(url).send().await?;
        let envelope: OrdersEnvelope = decode(response).await?;
        debug!(count = envelope.order.len(), "Fetched orders");
        Ok(envelope.order)
    }

    /// List every storefront customer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
        let url = self.endpoint(&["api", "customer", "getAll"])?;
        let response = self.inner.client.get(url).send().await?;
        let customers: Vec<Customer> = decode(response).await?;
        debug!(count = customers.len(), "Fetched customers");
        Ok(customers)
    }

    // =========================================================================
    // Client accounts
    // =========================================================================

    /// Register a new admin client account.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, request), fields(mobile = %request.mobile))]
    pub async fn register_client(
        &self,
        request: &SignUpRequest,
    ) -> Result<ApiResponse, BackendError> {
        let url = self.endpoint(&["api", "client", "register"])?;
        let response = self.inner.client.post(url).json(request).send().await?;
        decode_api_response(response).await
    }

    /// Log in with mobile number and password.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, request), fields(mobile = %request.mobile))]
    pub async fn login_client(&self, request: &SignInRequest) -> Result<ApiResponse, BackendError> {
        let url = self.endpoint(&["api", "client", "login"])?;
        let response = self.inner.client.post(url).json(request).send().await?;
        decode_api_response(response).await
    }
}

impl ProductApi for BackendClient {
    #[instrument(skip(self, request), fields(images = request.images.len()))]
    async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<ApiResponse, BackendError> {
        let request = ProductRequest::Create(request.clone());
        self.send_product_form(&["api", "products"], &request).await
    }

    #[instrument(
        skip(self, request),
        fields(
            product_id = %request.product_id,
            images = request.images.len(),
            deleted = request.deleted_images.len(),
        )
    )]
    async fn update_product(
        &self,
        request: &UpdateProductRequest,
    ) -> Result<ApiResponse, BackendError> {
        let request = ProductRequest::Update(request.clone());
        self.send_product_form(&["api", "products", "update"], &request)
            .await
    }
}

/// Build the multipart body for a product request.
fn multipart_form(request: &ProductRequest) -> Result<Form, BackendError> {
    let mut form = Form::new();
    for (name, value) in request.text_parts() {
        form = form.text(name, value);
    }
    for file in request.files() {
        let part = Part::bytes(file.data().to_vec())
            .file_name(file.file_name().to_string())
            .mime_str(file.content_type())?;
        form = form.part(IMAGES_FIELD, part);
    }
    Ok(form)
}

/// Decode a JSON body, turning non-success statuses into errors.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Backend returned error status");
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Decode a `{success, message}` envelope.
///
/// Client errors (4xx) that still carry the envelope are returned as a
/// rejected [`ApiResponse`] so the backend's message can reach the user;
/// anything else that is not a 2xx is an error.
async fn decode_api_response(response: Response) -> Result<ApiResponse, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()));
    }

    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        if let Ok(rejected) = serde_json::from_str::<ApiResponse>(&body) {
            if !rejected.success {
                debug!(status = status.as_u16(), "Backend rejected request");
                return Ok(rejected);
            }
        }
    }

    warn!(status = status.as_u16(), "Backend returned error status");
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("http://localhost:5000");
        let url = client.endpoint(&["api", "products", "update"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/products/update");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_ids() {
        let client = client("http://localhost:5000/shop/");
        let url = client.endpoint(&["api", "products", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/shop/api/products/a%20b%2Fc");
    }

    fn reply(status: u16, body: &str) -> Response {
        axum::http::Response::builder()
            .status(status)
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_client_error_with_rejection_body_is_a_rejection() {
        let response = reply(400, r#"{"success":false,"message":"Product name already exists"}"#);

        let decoded = decode_api_response(response).await.unwrap();

        assert!(!decoded.success);
        assert_eq!(decoded.message, "Product name already exists");
    }

    #[tokio::test]
    async fn test_other_error_statuses_stay_errors() {
        for (status, body) in [
            (400, "not json"),
            (409, r#"{"success":true}"#),
            (429, r#"{"success":false,"message":"slow down"}"#),
            (502, r#"{"success":false,"message":"upstream"}"#),
        ] {
            let err = decode_api_response(reply(status, body)).await.unwrap_err();
            assert!(
                matches!(err, BackendError::Status { status: s, .. } if s == status),
                "{status}: {err:?}"
            );
        }
    }

    #[test]
    fn test_debug_shows_base_url() {
        let client = client("http://backend.internal:5000");
        assert!(format!("{client:?}").contains("backend.internal"));
    }
}
