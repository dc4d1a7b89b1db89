//! Fabric backend REST API integration.
//!
//! All persistence, authentication and order computation live in the
//! external backend. This module provides:
//! - [`BackendClient`] for the product, order, customer and client endpoints
//! - Wire types with lenient decoding for the backend's loosely typed JSON
//! - [`BackendError`] covering transport, status and decoding failures

mod client;
mod error;
mod types;

pub use client::BackendClient;
pub use error::BackendError;
pub use types::{
    ApiResponse, Customer, LoggedInClient, Order, OrderItem, OrdersEnvelope, Product,
    ProductImage, ShippingForm, SignInRequest, SignUpRequest,
};
