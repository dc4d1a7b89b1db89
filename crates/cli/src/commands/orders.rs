//! Order commands.

use std::io::Write;

use fabric_admin::backend::Order;
use fabric_admin::routes::orders::{OrdersQuery, filter_orders};
use fabric_core::{OrderStatus, Price};

use super::{CommandError, backend_client, write_table};

const HEADER: [&str; 6] = ["ID", "DATE", "CUSTOMER", "EMAIL", "STATUS", "TOTAL"];
const VALID_STATUSES: &str = "pending, confirmed, processing, shipped, delivered, cancelled";

fn row(order: &Order) -> Vec<String> {
    vec![
        order.id.to_string(),
        order
            .created_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        order.shipping_form.full_name(),
        order.shipping_form.email.clone(),
        order.status.unwrap_or_default().to_string(),
        Price::inr(order.total.unwrap_or_default()).display(),
    ]
}

/// List orders, optionally by status.
///
/// # Errors
///
/// Returns an error for an unknown status, an unreachable backend or
/// failed output.
pub async fn list(status: Option<String>) -> Result<(), CommandError> {
    if let Some(status) = &status {
        status
            .parse::<OrderStatus>()
            .map_err(|_| CommandError::InvalidStatus(status.clone(), VALID_STATUSES))?;
    }

    let client = backend_client()?;
    let orders = client.list_orders().await?;
    let query = OrdersQuery {
        status,
        ..OrdersQuery::default()
    };
    let found = filter_orders(&orders, &query);

    let mut out = std::io::stdout().lock();
    let count = write_table(&mut out, &HEADER, found.into_iter().map(row))?;
    out.flush()?;

    tracing::info!("{count} of {} orders", orders.len());
    Ok(())
}
