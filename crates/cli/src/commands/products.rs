//! Product catalog commands.
//!
//! # Usage
//!
//! ```bash
//! # List every product
//! fab-cli products list
//!
//! # Only silk, matching "brocade"
//! fab-cli products list --category "Silk Fabric" --search brocade
//!
//! # Delete a product
//! fab-cli products delete 17
//! ```

use std::io::Write;

use fabric_admin::backend::Product;
use fabric_admin::routes::products::{ProductsQuery, filter_products};
use fabric_core::{Price, ProductId};

use super::{CommandError, backend_client, write_table};

const HEADER: [&str; 6] = ["ID", "NAME", "CATEGORY", "SUB-CATEGORY", "PRICE", "STOCK"];

fn row(product: &Product) -> Vec<String> {
    vec![
        product.id.to_string(),
        product.product_name.clone(),
        product.category.clone(),
        product.sub_category.clone(),
        product
            .price
            .map_or_else(|| "-".to_string(), |p| Price::inr(p).display()),
        product.in_stock.label().to_string(),
    ]
}

/// List products, optionally filtered.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or output fails.
pub async fn list(category: Option<String>, search: Option<String>) -> Result<(), CommandError> {
    let client = backend_client()?;
    let products = client.list_products().await?;
    let query = ProductsQuery { search, category };
    let found = filter_products(&products, &query);

    let mut out = std::io::stdout().lock();
    let count = write_table(&mut out, &HEADER, found.into_iter().map(row))?;
    out.flush()?;

    tracing::info!("{count} of {} products", products.len());
    Ok(())
}

/// Delete a product by ID.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or reports failure.
pub async fn delete(id: &str) -> Result<(), CommandError> {
    let client = backend_client()?;
    let id = ProductId::new(id);
    let response = client.delete_product(&id).await?;

    if !response.success {
        return Err(CommandError::Rejected(
            response.message_or("Failed to delete product"),
        ));
    }

    tracing::info!(product_id = %id, "{}", response.message_or("Product deleted successfully"));
    Ok(())
}
