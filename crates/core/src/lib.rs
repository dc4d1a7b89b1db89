//! Fabric Core - Shared types library.
//!
//! This crate provides common types used across the fabric admin components:
//! - `admin` - Administration dashboard (product editor, orders, customers)
//! - `cli` - Command-line tools for catalog inspection
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, contact details, catalog taxonomy and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
