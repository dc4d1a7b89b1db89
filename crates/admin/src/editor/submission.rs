//! Request shapes for saving a product, and the API seam they go through.

use std::future::Future;

use rust_decimal::Decimal;
use serde_json::Value;

use fabric_core::{Category, ImageId, ProductId, ProductTag, StockStatus, SubCategory};

use super::images::LocalFile;
use crate::backend::{ApiResponse, BackendError};

/// Flattened draft fields, as sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub category: Option<Category>,
    pub sub_category: Option<SubCategory>,
    pub stock: StockStatus,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub description: String,
    pub tags: Vec<ProductTag>,
    pub features: Vec<String>,
    pub paint_meter: Option<Decimal>,
    pub shirt_meter: Option<Decimal>,
}

/// Create-mode request: fields plus files to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductRequest {
    pub fields: ProductFields,
    pub images: Vec<LocalFile>,
}

/// Edit-mode request: fields, new files and remote images to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProductRequest {
    pub product_id: ProductId,
    pub fields: ProductFields,
    pub images: Vec<LocalFile>,
    pub deleted_images: Vec<ImageId>,
}

/// A save request in either mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRequest {
    Create(CreateProductRequest),
    Update(UpdateProductRequest),
}

impl ProductRequest {
    #[must_use]
    pub const fn fields(&self) -> &ProductFields {
        match self {
            Self::Create(request) => &request.fields,
            Self::Update(request) => &request.fields,
        }
    }

    /// Files to send as `images` parts.
    #[must_use]
    pub fn files(&self) -> &[LocalFile] {
        match self {
            Self::Create(request) => &request.images,
            Self::Update(request) => &request.images,
        }
    }

    /// Non-file multipart fields, in send order.
    ///
    /// List fields are JSON-encoded arrays. Unset numbers are sent as empty
    /// strings. `productId` and `deletedImages` only appear on updates.
    #[must_use]
    pub fn text_parts(&self) -> Vec<(&'static str, String)> {
        let fields = self.fields();
        let mut parts = Vec::with_capacity(13);

        if let Self::Update(request) = self {
            parts.push(("productId", request.product_id.to_string()));
        }

        parts.extend([
            ("productName", fields.name.clone()),
            ("category", label(fields.category)),
            ("subCategory", label(fields.sub_category)),
            ("inStock", fields.stock.as_wire().to_string()),
            ("price", number(fields.price)),
            ("discountPrice", number(fields.discount_price)),
            ("description", fields.description.clone()),
            (
                "tags",
                json_list(fields.tags.iter().map(ToString::to_string)),
            ),
            ("features", json_list(fields.features.iter().cloned())),
            ("paintMeter", number(fields.paint_meter)),
            ("shirtMeter", number(fields.shirt_meter)),
        ]);

        if let Self::Update(request) = self {
            parts.push((
                "deletedImages",
                json_list(request.deleted_images.iter().map(ToString::to_string)),
            ));
        }

        parts
    }

    /// Send through `api` to the endpoint matching the mode.
    ///
    /// # Errors
    ///
    /// Returns whatever the API reports for transport or server failures.
    pub async fn dispatch<A: ProductApi>(&self, api: &A) -> Result<ApiResponse, BackendError> {
        match self {
            Self::Create(request) => api.create_product(request).await,
            Self::Update(request) => api.update_product(request).await,
        }
    }
}

/// The product API collaborator the editor submits through.
pub trait ProductApi: Send + Sync {
    /// Create a product with its images.
    fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> impl Future<Output = Result<ApiResponse, BackendError>> + Send;

    /// Update a product, uploading new images and deleting removed ones.
    fn update_product(
        &self,
        request: &UpdateProductRequest,
    ) -> impl Future<Output = Result<ApiResponse, BackendError>> + Send;
}

fn label<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn number(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn json_list(items: impl Iterator<Item = String>) -> String {
    Value::from(items.collect::<Vec<_>>()).to_string()
}
