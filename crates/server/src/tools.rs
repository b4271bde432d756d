//! The four QRadar tools.
//!
//! Every tool returns a JSON envelope: `{"success": true, "data": .., "status_code": n}` when the
//! console answered with a 2xx/3xx status, and `{"success": false, "error": .., ..}` otherwise.
//! Tool-level rejections (unknown endpoint, missing body) use the same failure shape with extra
//! guidance fields.

use qradar_client::{ApiRequest, ApiResponse, Method, QRadarClient, QRadarError};
use qradar_discovery::{
    CatalogFilter, DiscoveryError, EndpointCache, ItemRange, Rejection, format_endpoint,
    validate_endpoint,
};
use rmcp::schemars;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

pub const QRADAR_GET: &str = "qradar_get";
pub const QRADAR_DELETE: &str = "qradar_delete";
pub const QRADAR_DISCOVER: &str = "qradar_discover";
pub const QRADAR_EXECUTE: &str = "qradar_execute";

const DEFAULT_DISCOVER_LIMIT: usize = 10;
const EXECUTE_METHODS: [&str; 3] = ["POST", "PUT", "PATCH"];

/// Per-call console credentials. Non-empty values replace the configured ones for that call.
#[derive(Debug, Default, Clone, Deserialize, schemars::JsonSchema)]
pub struct Credentials {
    #[schemars(description = "QRadar host (optional, overrides the configured host)")]
    #[serde(default)]
    pub qradar_host: Option<String>,
    #[schemars(description = "API token (optional, overrides the configured token)")]
    #[serde(default)]
    pub qradar_token: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetArgs {
    #[schemars(description = "API path, e.g. /siem/offenses")]
    pub endpoint: String,
    #[schemars(description = "QRadar filter expression, e.g. status=OPEN")]
    #[serde(default)]
    pub filter: Option<String>,
    #[schemars(description = "Fields to return")]
    #[serde(default)]
    pub fields: Option<String>,
    #[schemars(description = "Pagination (e.g., 0-49)")]
    #[serde(default)]
    pub range: Option<String>,
    #[serde(flatten)]
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteArgs {
    #[schemars(description = "API path with resource ID")]
    pub endpoint: String,
    #[serde(flatten)]
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DiscoverArgs {
    #[schemars(description = "Search term matched against endpoint path and summary")]
    pub search: String,
    #[schemars(description = "HTTP method to restrict to (GET, POST, PUT, DELETE, PATCH)")]
    #[serde(default)]
    pub method: Option<String>,
    #[schemars(description = "Maximum number of endpoints to return (default 10)")]
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(flatten)]
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExecuteArgs {
    #[schemars(description = "POST, PUT or PATCH")]
    pub method: String,
    #[schemars(description = "EXACT path from qradar_discover")]
    pub endpoint: String,
    #[schemars(description = "Query parameters")]
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[schemars(description = "Request body (for BODY type params)")]
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(flatten)]
    pub credentials: Credentials,
}

/// Tool implementations shared by the MCP service and the REST facade.
#[derive(Clone, Debug)]
pub struct QRadarTools {
    client: QRadarClient,
    cache: EndpointCache,
}

impl QRadarTools {
    #[must_use]
    pub fn new(client: QRadarClient, cache: EndpointCache) -> Self {
        Self { client, cache }
    }

    #[must_use]
    pub fn cache(&self) -> &EndpointCache {
        &self.cache
    }

    /// Run a tool by name with raw JSON arguments.
    pub async fn call(&self, name: &str, arguments: Value) -> Value {
        info!(tool = %name, "tool call");
        match name {
            QRADAR_GET => match parse_args(name, arguments) {
                Ok(args) => self.get(args).await,
                Err(e) => e,
            },
            QRADAR_DELETE => match parse_args(name, arguments) {
                Ok(args) => self.delete(args).await,
                Err(e) => e,
            },
            QRADAR_DISCOVER => match parse_args(name, arguments) {
                Ok(args) => self.discover(args).await,
                Err(e) => e,
            },
            QRADAR_EXECUTE => match parse_args(name, arguments) {
                Ok(args) => self.execute(args).await,
                Err(e) => e,
            },
            other => failure_message(format!("Unknown tool: {other}")),
        }
    }

    pub async fn get(&self, args: GetArgs) -> Value {
        if args.endpoint.is_empty() {
            return failure_message("endpoint is required");
        }
        let client = match self.client_for(&args.credentials) {
            Ok(c) => c,
            Err(e) => return e,
        };

        let mut req = ApiRequest::get(args.endpoint);
        if let Some(filter) = args.filter.filter(|f| !f.is_empty()) {
            req = req.param("filter", filter);
        }
        if let Some(fields) = args.fields.filter(|f| !f.is_empty()) {
            req = req.param("fields", fields);
        }
        if let Some(range) = args.range.filter(|r| !r.is_empty()) {
            req = req.range(range);
        }
        envelope(client.request(req).await)
    }

    pub async fn delete(&self, args: DeleteArgs) -> Value {
        if args.endpoint.is_empty() {
            return failure_message("endpoint is required");
        }
        let client = match self.client_for(&args.credentials) {
            Ok(c) => c,
            Err(e) => return e,
        };
        envelope(client.request(ApiRequest::delete(args.endpoint)).await)
    }

    /// Search the endpoint catalog and return formatted endpoint metadata.
    pub async fn discover(&self, args: DiscoverArgs) -> Value {
        if args.search.is_empty() {
            return failure_message("search term is required");
        }
        let client = match self.client_for(&args.credentials) {
            Ok(c) => c,
            Err(e) => return e,
        };

        let method = args
            .method
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_ascii_uppercase();
        let mut filter = CatalogFilter::path_contains(&args.search)
            .or(CatalogFilter::summary_contains(&args.search));
        if !method.is_empty() {
            filter = filter.and(CatalogFilter::method_eq(method.as_str()));
        }
        let range = ItemRange::first(args.limit.unwrap_or(DEFAULT_DISCOVER_LIMIT));

        let records = match client.list_endpoints(&filter, range).await {
            Ok(r) => r,
            Err(e) => return failure(&e),
        };

        if records.is_empty() {
            return json!({
                "success": true,
                "count": 0,
                "endpoints": [],
                "message": format!(
                    "NO ENDPOINTS FOUND for search='{}' method='{method}'. Try different search terms.",
                    args.search
                ),
            });
        }

        let formatted: Vec<_> = records
            .iter()
            .map(|r| format_endpoint(r, &self.cache))
            .collect();
        debug!(count = formatted.len(), cached = self.cache.len(), "discovered endpoints");

        json!({
            "success": true,
            "count": formatted.len(),
            "endpoints": formatted,
            "instruction": "Use EXACT paths shown above with qradar_execute. DO NOT modify or guess paths.",
        })
    }

    /// Validate a mutating request against the catalog, then send it.
    pub async fn execute(&self, args: ExecuteArgs) -> Value {
        let method = args.method.trim().to_ascii_uppercase();
        if !EXECUTE_METHODS.contains(&method.as_str()) {
            return failure_message("method must be POST, PUT, or PATCH");
        }
        if args.endpoint.is_empty() {
            return failure_message("endpoint is required");
        }
        let client = match self.client_for(&args.credentials) {
            Ok(c) => c,
            Err(e) => return e,
        };

        let validation = match validate_endpoint(&client, &method, &args.endpoint).await {
            Ok(v) => v,
            Err(DiscoveryError::CatalogQueryFailed(e)) => {
                let mut out = failure_message(e.message);
                if let Some(status) = e.status_code {
                    out["status_code"] = json!(status);
                }
                if let Some(detail) = e.detail {
                    out["detail"] = Value::String(detail);
                }
                return out;
            }
        };

        let has_body = args.body.as_ref().is_some_and(has_content);
        let matched = match validation.preflight(&method, &args.endpoint, has_body) {
            Ok(m) => m,
            Err(rejection) => return rejection_envelope(rejection),
        };
        debug!(
            method = %method,
            endpoint = %args.endpoint,
            pattern = ?matched.matched_pattern,
            "endpoint validated"
        );

        let Ok(http_method) = method.parse::<Method>() else {
            return failure_message("method must be POST, PUT, or PATCH");
        };
        let mut req = ApiRequest::new(http_method, args.endpoint);
        if let Some(params) = &args.params {
            req = req.params_from_object(params);
        }
        if let Some(body) = args.body.filter(has_content) {
            req = req.body(body);
        }
        envelope(client.request(req).await)
    }

    fn client_for(&self, credentials: &Credentials) -> Result<QRadarClient, Value> {
        self.client
            .with_overrides(
                credentials.qradar_host.as_deref(),
                credentials.qradar_token.as_deref(),
            )
            .map_err(|e| failure(&e))
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, Value> {
    let arguments = if arguments.is_null() {
        Value::Object(Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| failure_message(format!("Invalid arguments for {tool}: {e}")))
}

fn has_content(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Turn a transport outcome into a tool envelope.
pub fn envelope(result: qradar_client::Result<ApiResponse>) -> Value {
    match result {
        Ok(resp) => json!({
            "success": true,
            "data": resp.data,
            "status_code": resp.status,
        }),
        Err(e) => failure(&e),
    }
}

fn failure(e: &QRadarError) -> Value {
    let mut out = failure_message(e.to_string());
    if let Some(status) = e.status_code() {
        out["status_code"] = json!(status);
    }
    if let Some(detail) = e.detail() {
        out["detail"] = detail;
    }
    out
}

fn failure_message(error: impl Into<String>) -> Value {
    json!({"success": false, "error": error.into()})
}

fn rejection_envelope(rejection: Rejection) -> Value {
    let error = rejection.to_string();
    match rejection {
        Rejection::EndpointNotFound {
            suggestion,
            similar,
            ..
        } => json!({
            "success": false,
            "error": error,
            "suggestion": suggestion,
            "similar_endpoints": similar,
        }),
        Rejection::BodyRequiredMissing { body_sample } => json!({
            "success": false,
            "error": error,
            "body_schema": body_sample,
            "suggestion": "Pass data in 'body' parameter, not 'params'",
        }),
    }
}

/// `true` when a tool envelope reports success.
#[must_use]
pub fn is_success(envelope: &Value) -> bool {
    envelope.get("success").and_then(Value::as_bool) == Some(true)
}
