//! Core types for the fabric admin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod mobile;
pub mod price;
pub mod status;

pub use catalog::{CatalogError, Category, ProductTag, SubCategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use mobile::{MobileNumber, MobileNumberError};
pub use price::{CurrencyCode, Price};
pub use status::*;
