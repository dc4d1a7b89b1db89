//! Customer commands.

use std::io::Write;

use fabric_admin::backend::Customer;
use fabric_admin::routes::users::{UsersQuery, filter_customers};
use fabric_core::CustomerStatus;

use super::{CommandError, backend_client, write_table};

const HEADER: [&str; 4] = ["ID", "NAME", "EMAIL", "STATUS"];

fn row(customer: &Customer) -> Vec<String> {
    vec![
        customer.id.to_string(),
        customer.full_name(),
        customer.email.clone(),
        customer.status().to_string(),
    ]
}

/// List customers, optionally by status (`active` / `offline`).
///
/// # Errors
///
/// Returns an error for an unknown status, an unreachable backend or
/// failed output.
pub async fn list(status: Option<String>) -> Result<(), CommandError> {
    if let Some(status) = &status {
        status
            .parse::<CustomerStatus>()
            .map_err(|_| CommandError::InvalidStatus(status.clone(), "active, offline"))?;
    }

    let client = backend_client()?;
    let customers = client.list_customers().await?;
    let query = UsersQuery {
        status,
        ..UsersQuery::default()
    };
    let found = filter_customers(&customers, &query);

    let mut out = std::io::stdout().lock();
    let count = write_table(&mut out, &HEADER, found.into_iter().map(row))?;
    out.flush()?;

    tracing::info!("{count} of {} customers", customers.len());
    Ok(())
}
