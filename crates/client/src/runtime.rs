//! Runtime for issuing QRadar REST API calls.
//!
//! Every call carries the SEC token and API version headers from [`QRadarConfig`]; responses are
//! classified into [`ApiResponse`] (2xx/3xx) or a [`QRadarError`].

use crate::config::QRadarConfig;
use crate::error::{QRadarError, Result, format_status_error};
use crate::safety::{display_host, sanitize_reqwest_error};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// One outbound API call, relative to `<host>/api`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Inclusive item range (`0-49`), sent as `Range: items=<range>`.
    pub range: Option<String>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: Vec::new(),
            body: None,
            range: None,
        }
    }

    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Add every non-null entry of a JSON object as a query parameter.
    #[must_use]
    pub fn params_from_object(mut self, params: &Map<String, Value>) -> Self {
        for (k, v) in params {
            if v.is_null() {
                continue;
            }
            self.params.push((k.clone(), value_to_string(v)));
        }
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn range(mut self, range: impl fmt::Display) -> Self {
        self.range = Some(range.to_string());
        self
    }

    fn normalized_endpoint(&self) -> String {
        if self.endpoint.starts_with('/') {
            self.endpoint.clone()
        } else {
            format!("/{}", self.endpoint)
        }
    }
}

/// Successful API response. `data` is `null` for `204 No Content`, the parsed JSON body when the
/// body is JSON, and the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Clone)]
pub struct QRadarClient {
    inner: Arc<QRadarClientInner>,
}

struct QRadarClientInner {
    config: QRadarConfig,
    http: Client,
}

impl QRadarClient {
    /// Build a client for one console.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built (TLS backend setup).
    pub fn new(config: QRadarConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(!config.verify_ssl);
        if let Some(t) = config.timeout() {
            builder = builder.timeout(t);
        }
        let http = builder.build().map_err(|e| {
            QRadarError::Config(format!(
                "failed to build HTTP client: {}",
                sanitize_reqwest_error(&e)
            ))
        })?;

        Ok(Self {
            inner: Arc::new(QRadarClientInner { config, http }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &QRadarConfig {
        &self.inner.config
    }

    /// A client for the same console settings with host and/or token replaced.
    ///
    /// Returns a cheap clone of `self` when the overrides change nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a new HTTP client has to be built and that fails.
    pub fn with_overrides(&self, host: Option<&str>, api_token: Option<&str>) -> Result<Self> {
        let config = self.inner.config.with_overrides(host, api_token);
        if config == self.inner.config {
            return Ok(self.clone());
        }
        Self::new(config)
    }

    /// Execute one API call.
    ///
    /// # Errors
    ///
    /// Returns an error if no host is configured, the console cannot be reached, the call times
    /// out, or the console answers with a 4xx/5xx status.
    pub async fn request(&self, req: ApiRequest) -> Result<ApiResponse> {
        let cfg = &self.inner.config;
        if cfg.host.is_empty() {
            return Err(QRadarError::Config(
                "QRadar host is not configured (set QRADAR_HOST or pass qradar_host)".to_string(),
            ));
        }

        let endpoint = req.normalized_endpoint();
        let url = Url::parse(&format!("{}{endpoint}", cfg.base_url()))
            .map_err(|e| QRadarError::Config(format!("Invalid URL: {e}")))?;

        let mut builder = self.inner.http.request(req.method.clone(), url);
        for (name, value) in cfg.headers() {
            builder = builder.header(name, value);
        }
        if let Some(range) = &req.range {
            builder = builder.header("Range", format!("items={range}"));
        }
        if !req.params.is_empty() {
            builder = builder.query(&req.params);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        debug!(method = %req.method, endpoint = %endpoint, range = ?req.range, "qradar request");

        let response = builder
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, &cfg.host))?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse {
                status: status.as_u16(),
                data: Value::Null,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e, &cfg.host))?;
        let data = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::String(text));

        if status.is_client_error() || status.is_server_error() {
            let status = status.as_u16();
            debug!(status, endpoint = %endpoint, "qradar error status");
            return Err(QRadarError::Status {
                status,
                message: format_status_error(status, &data),
                detail: data,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            data,
        })
    }
}

impl fmt::Debug for QRadarClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QRadarClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

fn classify_transport_error(e: &reqwest::Error, host: &str) -> QRadarError {
    let detail = sanitize_reqwest_error(e);
    if e.is_timeout() {
        QRadarError::Timeout { detail }
    } else if e.is_connect() {
        QRadarError::Connect {
            host: display_host(host),
            detail,
        }
    } else {
        QRadarError::Request { detail }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}
