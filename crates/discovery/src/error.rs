//! Error types for `qradar-discovery`.

use thiserror::Error;

/// Failure reported by a [`crate::CatalogSource`] while querying the remote catalog.
///
/// The message is already sanitized by the source; it is surfaced to callers as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CatalogQueryError {
    /// Short, human readable classification (e.g. `Unauthorized`, `Request timed out`).
    pub message: String,
    /// HTTP status code when the catalog answered with an error status.
    pub status_code: Option<u16>,
    /// Upstream detail (error body or transport error text).
    pub detail: Option<String>,
}

impl CatalogQueryError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Main error type for discovery operations.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The catalog lookup itself failed (network, auth, malformed response).
    #[error("Catalog query failed: {0}")]
    CatalogQueryFailed(#[from] CatalogQueryError),
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
