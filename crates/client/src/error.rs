//! Error types for `qradar-client`.

use qradar_discovery::CatalogQueryError;
use serde_json::Value;
use thiserror::Error;

/// Classified failure of a QRadar API call.
#[derive(Error, Debug)]
pub enum QRadarError {
    /// The client cannot issue requests (no host, bad URL, TLS setup failure).
    #[error("Configuration error: {0}")]
    Config(String),

    /// TCP/TLS connection to the console failed.
    #[error("Connection failed: {host}")]
    Connect { host: String, detail: String },

    #[error("Request timed out")]
    Timeout { detail: String },

    /// The console answered with a 4xx/5xx status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        detail: Value,
    },

    /// Any other transport failure.
    #[error("Unexpected error")]
    Request { detail: String },

    /// `/help/endpoints` answered with something that is not a list of endpoints.
    #[error("Malformed catalog response: {0}")]
    MalformedCatalog(String),
}

impl QRadarError {
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream detail for the caller: the error body for status failures, the sanitized
    /// transport message otherwise.
    #[must_use]
    pub fn detail(&self) -> Option<Value> {
        match self {
            Self::Status { detail, .. } => Some(detail.clone()),
            Self::Connect { detail, .. } | Self::Timeout { detail } | Self::Request { detail } => {
                Some(Value::String(detail.clone()))
            }
            Self::Config(_) | Self::MalformedCatalog(_) => None,
        }
    }
}

impl From<QRadarError> for CatalogQueryError {
    fn from(value: QRadarError) -> Self {
        let mut err = Self::new(value.to_string());
        if let Some(status) = value.status_code() {
            err = err.with_status(status);
        }
        match value.detail() {
            Some(Value::String(s)) => err.with_detail(s),
            Some(other) => err.with_detail(other.to_string()),
            None => err,
        }
    }
}

/// Result type alias for QRadar client operations.
pub type Result<T> = std::result::Result<T, QRadarError>;

/// Short label for an HTTP error status, as shown to agents.
#[must_use]
pub fn status_label(status: u16) -> String {
    match status {
        400 => "Bad request".to_string(),
        401 => "Unauthorized".to_string(),
        403 => "Forbidden".to_string(),
        404 => "Not found".to_string(),
        409 => "Conflict".to_string(),
        422 => "Invalid parameter".to_string(),
        429 => "Rate limited".to_string(),
        500 => "Server error".to_string(),
        other => format!("HTTP {other}"),
    }
}

/// Status label, suffixed with the console's own `message` when the error body carries one.
#[must_use]
pub fn format_status_error(status: u16, body: &Value) -> String {
    let base = status_label(status);
    match body.get("message") {
        Some(Value::String(m)) => format!("{base}: {m}"),
        Some(other) => format!("{base}: {other}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_messages() {
        assert_eq!(format_status_error(401, &json!(null)), "Unauthorized");
        assert_eq!(
            format_status_error(422, &json!({"message": "bad filter", "code": 13})),
            "Invalid parameter: bad filter"
        );
        assert_eq!(format_status_error(418, &json!("teapot")), "HTTP 418");
    }

    #[test]
    fn converts_into_catalog_query_error() {
        let err: CatalogQueryError = QRadarError::Status {
            status: 403,
            message: "Forbidden".to_string(),
            detail: json!({"message": "no"}),
        }
        .into();
        assert_eq!(err.message, "Forbidden");
        assert_eq!(err.status_code, Some(403));
        assert_eq!(err.detail.as_deref(), Some(r#"{"message":"no"}"#));

        let err: CatalogQueryError = QRadarError::Timeout {
            detail: "operation timed out".to_string(),
        }
        .into();
        assert_eq!(err.message, "Request timed out");
        assert_eq!(err.status_code, None);
    }
}
