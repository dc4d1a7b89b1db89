//! Command implementations.

pub mod customers;
pub mod orders;
pub mod products;

use std::io::Write;

use fabric_admin::backend::{BackendClient, BackendError};
use fabric_admin::config::{BackendConfig, ConfigError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Invalid status: {0}. Valid statuses: {1}")]
    InvalidStatus(String, &'static str),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a backend client from `BACKEND_URL` (and `.env`, if present).
///
/// # Errors
///
/// Returns an error if the configuration is missing or the client cannot
/// be built.
pub fn backend_client() -> Result<BackendClient, CommandError> {
    dotenvy::dotenv().ok();
    let config = BackendConfig::from_env()?;
    tracing::debug!(backend = %config.base_url, "Using backend");
    Ok(BackendClient::new(&config)?)
}

/// Write rows as tab-separated lines under a header.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn write_table<W: Write>(
    out: &mut W,
    header: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<usize, std::io::Error> {
    writeln!(out, "{}", header.join("\t"))?;
    let mut count = 0;
    for row in rows {
        writeln!(out, "{}", row.join("\t"))?;
        count += 1;
    }
    Ok(count)
}
