//! HTTP mode: MCP streamable HTTP at `/mcp` plus a small REST facade.

use crate::service::QRadarMcp;
use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

const PUBLIC_PATHS: [&str; 1] = ["/health"];
const UNAUTHORIZED: &str = "Unauthorized. Provide Authorization: Bearer <MCP_API_KEY> header.";

#[derive(Clone)]
struct AppState {
    mcp: QRadarMcp,
    api_key: Option<Arc<str>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallRequest {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Build the HTTP application. `api_key`, when set, is required as a bearer token on every route
/// except `/health`.
pub fn router(mcp: QRadarMcp, api_key: Option<String>) -> Router {
    let state = AppState {
        mcp: mcp.clone(),
        api_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
    };

    let mcp_service = StreamableHttpService::new(
        move || Ok(mcp.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/call", post(call_tool))
        .nest_service("/mcp", mcp_service)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(req).await;
    };
    if PUBLIC_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    if bearer_token(req.headers()) == Some(expected) {
        return next.run(req).await;
    }

    warn!(path = %req.uri().path(), "rejected request without a valid API key");
    (StatusCode::UNAUTHORIZED, Json(json!({"error": UNAUTHORIZED}))).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let authz = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = authz.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "mode": "http",
        "tools": state.mcp.tool_descriptors().len(),
        "auth_required": state.api_key.is_some(),
        "cached_endpoints": state.mcp.tools().cache().len(),
    }))
}

async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    Json(json!({"tools": state.mcp.tool_descriptors()}))
}

async fn call_tool(
    State(state): State<AppState>,
    payload: Result<Json<ToolCallRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": e.body_text()})),
            )
                .into_response();
        }
    };

    let result = state.mcp.tools().call(&req.name, req.arguments).await;
    Json(json!({"result": result})).into_response()
}
