//! Wire types for the fabric backend REST API.
//!
//! The backend is loosely typed: numbers sometimes arrive as strings, list
//! fields sometimes arrive JSON-encoded inside a string, and optional fields
//! may be missing or empty. Deserialization is lenient so one odd record does
//! not take down a whole listing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fabric_core::{
    ClientId, CustomerId, CustomerStatus, ImageId, OrderId, OrderStatus, Price, ProductId,
    StockStatus,
};

/// Standard `{success, message, data?}` envelope returned by mutating endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Backend message, or `fallback` when the backend sent none.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        if self.message.trim().is_empty() {
            fallback.to_string()
        } else {
            self.message.clone()
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// An image stored by the backend.
///
/// The backend identifies images by their stored file name; that name is what
/// the update endpoint expects back in `deletedImages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductImage {
    #[serde(rename = "filename", alias = "identifier", alias = "id", default)]
    pub id: ImageId,
    #[serde(default)]
    pub url: String,
}

/// A product entity as listed by the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "product_id", alias = "productId", alias = "_id", default)]
    pub id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub in_stock: StockStatus,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "de::string_list")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub paint_meter: Option<Decimal>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub shirt_meter: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// First image URL, used as the listing thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Envelope returned by the order listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersEnvelope {
    #[serde(default)]
    pub order: Vec<Order>,
}

/// Shipping details captured at checkout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl ShippingForm {
    /// "First Last", trimmed when either part is missing.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A purchased line item.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItem {
    pub product_name: String,
    pub quantity: u32,
    #[serde(deserialize_with = "de::lenient_decimal")]
    pub price: Option<Decimal>,
    pub images: Vec<ProductImage>,
}

impl OrderItem {
    /// `quantity × price`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::inr(self.price.unwrap_or_default()).times(self.quantity)
    }
}

/// An order as listed by the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "order_id", alias = "orderId", alias = "id", default)]
    pub id: OrderId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "order_status", default, deserialize_with = "de::lenient_enum")]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub shipping_form: ShippingForm,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub subtotal: Option<Decimal>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub discount: Option<Decimal>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub tax: Option<Decimal>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub total: Option<Decimal>,
}

// =============================================================================
// Customers
// =============================================================================

/// A storefront customer account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Customer {
    #[serde(rename = "customer_id", alias = "_id", alias = "id", default)]
    pub id: CustomerId,
    #[serde(rename = "customer_firstName", default)]
    pub first_name: String,
    #[serde(rename = "customer_lastName", default)]
    pub last_name: String,
    #[serde(rename = "customer_email", default)]
    pub email: String,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
}

impl Customer {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    #[must_use]
    pub fn status(&self) -> CustomerStatus {
        CustomerStatus::from(self.is_active)
    }
}

// =============================================================================
// Client (admin) accounts
// =============================================================================

/// Credentials sent to the login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest {
    pub mobile: String,
    pub password: String,
}

/// Registration payload for a new admin client account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub company_name: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
}

/// The `data` object returned by a successful login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggedInClient {
    #[serde(alias = "_id", alias = "client_id")]
    pub id: ClientId,
    pub company_name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
}

mod de {
    //! Lenient field deserializers.

    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(serde_json::Number),
        Text(String),
    }

    /// Decimal from a number, a numeric string, an empty string or null.
    pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<NumberOrText>::deserialize(deserializer)?;
        let text = match raw {
            None => return Ok(None),
            Some(NumberOrText::Number(n)) => n.to_string(),
            Some(NumberOrText::Text(s)) => s,
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Some)
            .map_err(serde::de::Error::custom)
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrEncoded {
        List(Vec<String>),
        Encoded(String),
    }

    /// String list from a JSON array, a JSON-encoded array inside a string,
    /// or null.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<ListOrEncoded>::deserialize(deserializer)? {
            None => Ok(Vec::new()),
            Some(ListOrEncoded::List(items)) => Ok(items),
            Some(ListOrEncoded::Encoded(s)) if s.trim().is_empty() => Ok(Vec::new()),
            Some(ListOrEncoded::Encoded(s)) => {
                serde_json::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    }

    /// Enum parsed from a string; unknown values become `None`.
    pub fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| s.trim().parse().ok()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_from_backend_json() {
        let product: Product = serde_json::from_value(json!({
            "product_id": 17,
            "productName": "Indigo Block Print",
            "category": "Cotton Fabric",
            "subCategory": "Printed Cotton",
            "inStock": "No",
            "price": "450",
            "discountPrice": 399.5,
            "tags": "[\"New Arrival\",\"Trending\"]",
            "features": ["Hand block printed"],
            "paintMeter": "",
            "images": [{"filename": "171-a.jpg", "url": "http://cdn/171-a.jpg"}],
            "createdAt": "2025-01-15T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "17");
        assert_eq!(product.in_stock, StockStatus::OutOfStock);
        assert_eq!(product.price, Some(Decimal::from(450)));
        assert_eq!(product.discount_price, Some(Decimal::new(3995, 1)));
        assert_eq!(product.tags, vec!["New Arrival", "Trending"]);
        assert_eq!(product.paint_meter, None);
        assert_eq!(product.images[0].id.as_str(), "171-a.jpg");
        assert_eq!(product.thumbnail(), Some("http://cdn/171-a.jpg"));
    }

    #[test]
    fn test_product_with_missing_fields() {
        let product: Product = serde_json::from_value(json!({"product_id": "p1"})).unwrap();
        assert!(product.images.is_empty());
        assert!(product.features.is_empty());
        assert_eq!(product.in_stock, StockStatus::InStock);
    }

    #[test]
    fn test_order_envelope_with_unknown_status() {
        let envelope: OrdersEnvelope = serde_json::from_value(json!({
            "order": [
                {"_id": "o1", "status": "shipped", "total": "1200"},
                {"_id": "o2", "status": "returned"}
            ]
        }))
        .unwrap();

        assert_eq!(envelope.order.len(), 2);
        assert_eq!(envelope.order[0].status, Some(OrderStatus::Shipped));
        assert_eq!(envelope.order[1].status, None);
    }

    #[test]
    fn test_order_item_line_total() {
        let item: OrderItem =
            serde_json::from_value(json!({"productName": "Raw Silk", "quantity": 3, "price": 250}))
                .unwrap();
        assert_eq!(item.line_total().display(), "₹750.00");
    }

    #[test]
    fn test_customer_fields() {
        let customer: Customer = serde_json::from_value(json!({
            "customer_firstName": "Asha",
            "customer_lastName": "Patel",
            "customer_email": "asha@example.com",
            "isActive": false
        }))
        .unwrap();
        assert_eq!(customer.full_name(), "Asha Patel");
        assert_eq!(customer.status(), CustomerStatus::Offline);
    }

    #[test]
    fn test_api_response_message_fallback() {
        let response: ApiResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert_eq!(response.message_or("Sign up failed"), "Sign up failed");
    }
}
