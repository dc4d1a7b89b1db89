//! Backend API errors.

use thiserror::Error;

/// Errors that can occur when talking to the fabric backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request could not be sent or the connection failed.
    #[error("Backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("Backend response error: {0}")]
    Decode(String),

    /// The configured base URL cannot carry path segments.
    #[error("Backend URL cannot be used as a base: {0}")]
    CannotBeABase(String),
}

impl BackendError {
    /// Whether the failure happened before any response arrived.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}
