//! In-process stand-in for a QRadar console.
//!
//! Serves `/api/help/endpoints` from a fixed catalog (evaluating the `filter` parameter and the
//! `Range` header like the console does), `/api/status/<code>` for canned error statuses,
//! `/api/text` for a non-JSON body, and echoes every other request back as JSON.

use anyhow::{Context as _, bail};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;
use qradar_discovery::{CatalogField, CatalogFilter, EndpointRecord};
use serde_json::{Map, Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Default)]
struct FakeState {
    catalog: Vec<Value>,
    catalog_override: Mutex<Option<Value>>,
    required_token: Mutex<Option<String>>,
    catalog_queries: Mutex<Vec<(String, Option<String>)>>,
    requests: Mutex<Vec<Value>>,
}

pub struct FakeQRadar {
    addr: SocketAddr,
    state: Arc<FakeState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeQRadar {
    /// Bind an ephemeral localhost port and serve `catalog` (raw `/help/endpoints` entries).
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(catalog: Vec<Value>) -> anyhow::Result<Self> {
        let state = Arc::new(FakeState {
            catalog,
            ..FakeState::default()
        });
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind fake qradar")?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(tx),
        })
    }

    /// Console URL (without the `/api` suffix).
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Reject requests whose `SEC` header differs from `token` with a 401.
    pub fn require_token(&self, token: &str) {
        *self.state.required_token.lock() = Some(token.to_string());
    }

    /// Serve `payload` from `/help/endpoints` verbatim, ignoring filter and range.
    pub fn set_catalog_override(&self, payload: Value) {
        *self.state.catalog_override.lock() = Some(payload);
    }

    /// `(filter, Range header)` of every catalog query so far.
    #[must_use]
    pub fn catalog_queries(&self) -> Vec<(String, Option<String>)> {
        self.state.catalog_queries.lock().clone()
    }

    /// Echo payloads of every non-catalog request so far.
    #[must_use]
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().clone()
    }
}

impl Drop for FakeQRadar {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let required = state.required_token.lock().clone();
    if let Some(required) = required
        && header("sec").as_deref() != Some(required.as_str())
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "http_response": {"code": 401, "message": "You are unauthorized to access the requested resource."},
                "code": 11,
                "message": "Invalid SEC header",
            })),
        )
            .into_response();
    }

    let query = parse_query(uri.query().unwrap_or(""));
    let path = uri.path();

    if path == "/api/help/endpoints" && method == Method::GET {
        let filter = query
            .get("filter")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let range = header("range");
        state
            .catalog_queries
            .lock()
            .push((filter.clone(), range.clone()));

        if let Some(payload) = state.catalog_override.lock().clone() {
            return Json(payload).into_response();
        }

        return match select_catalog(&state.catalog, &filter, range.as_deref()) {
            Ok(items) => Json(Value::Array(items)).into_response(),
            Err(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"code": 1005, "message": e.to_string()})),
            )
                .into_response(),
        };
    }

    if let Some(code) = path.strip_prefix("/api/status/") {
        let Some(status) = code.parse::<u16>().ok().and_then(|c| StatusCode::from_u16(c).ok())
        else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        return (
            status,
            Json(json!({"code": status.as_u16(), "message": format!("fake status {}", status.as_u16())})),
        )
            .into_response();
    }

    if path == "/api/text" {
        return "plain text body".into_response();
    }

    let mut echoed_headers = Map::new();
    for name in ["sec", "version", "accept", "content-type", "range"] {
        if let Some(v) = header(name) {
            echoed_headers.insert(name.to_string(), Value::String(v));
        }
    }
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    let echo = json!({
        "method": method.as_str(),
        "path": path,
        "query": Value::Object(query),
        "headers": Value::Object(echoed_headers),
        "body": body,
    });
    state.requests.lock().push(echo.clone());
    Json(echo).into_response()
}

fn parse_query(raw: &str) -> Map<String, Value> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

fn select_catalog(
    catalog: &[Value],
    filter: &str,
    range: Option<&str>,
) -> anyhow::Result<Vec<Value>> {
    let filter = if filter.trim().is_empty() {
        None
    } else {
        Some(parse_filter(filter)?)
    };

    let (start, end) = match range.and_then(|r| r.strip_prefix("items=")) {
        Some(r) => {
            let (a, b) = r.split_once('-').context("range must be items=start-end")?;
            (a.trim().parse::<usize>()?, b.trim().parse::<usize>()?)
        }
        None => (0, usize::MAX - 1),
    };

    let mut out = Vec::new();
    for raw in catalog {
        let record: EndpointRecord =
            serde_json::from_value(raw.clone()).context("catalog entry is not an endpoint")?;
        if filter.as_ref().is_none_or(|f| f.matches(&record)) {
            out.push(raw.clone());
        }
    }
    Ok(out
        .into_iter()
        .skip(start)
        .take(end.saturating_sub(start) + 1)
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Eq,
    ILike,
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> anyhow::Result<Vec<Token>> {
    let mut out = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                out.push(Token::LParen);
            }
            ')' => {
                chars.next();
                out.push(Token::RParen);
            }
            '=' => {
                chars.next();
                out.push(Token::Eq);
            }
            '\'' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => s.push(escaped),
                            None => bail!("dangling escape in filter"),
                        },
                        Some('\'') => break,
                        Some(other) => s.push(other),
                        None => bail!("unterminated string in filter"),
                    }
                }
                out.push(Token::Str(s));
            }
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push(match word.to_ascii_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "ILIKE" => Token::ILike,
                    _ => Token::Ident(word),
                });
            }
            other => bail!("unexpected character {other:?} in filter"),
        }
    }
    Ok(out)
}

/// Parse the subset of the console filter language that catalog queries use.
///
/// # Errors
///
/// Returns an error for anything outside `field='v'`, `field ILIKE 'p'`, `AND`, `OR` and
/// parentheses.
pub fn parse_filter(input: &str) -> anyhow::Result<CatalogFilter> {
    let tokens = tokenize(input)?;
    let mut pos = 0;
    let filter = parse_or(&tokens, &mut pos)?;
    if pos != tokens.len() {
        bail!("trailing tokens in filter: {input}");
    }
    Ok(filter)
}

fn parse_or(tokens: &[Token], pos: &mut usize) -> anyhow::Result<CatalogFilter> {
    let mut left = parse_and(tokens, pos)?;
    while tokens.get(*pos) == Some(&Token::Or) {
        *pos += 1;
        left = left.or(parse_and(tokens, pos)?);
    }
    Ok(left)
}

fn parse_and(tokens: &[Token], pos: &mut usize) -> anyhow::Result<CatalogFilter> {
    let mut left = parse_atom(tokens, pos)?;
    while tokens.get(*pos) == Some(&Token::And) {
        *pos += 1;
        left = left.and(parse_atom(tokens, pos)?);
    }
    Ok(left)
}

fn parse_atom(tokens: &[Token], pos: &mut usize) -> anyhow::Result<CatalogFilter> {
    match tokens.get(*pos) {
        Some(Token::LParen) => {
            *pos += 1;
            let inner = parse_or(tokens, pos)?;
            if tokens.get(*pos) != Some(&Token::RParen) {
                bail!("missing ')' in filter");
            }
            *pos += 1;
            Ok(inner)
        }
        Some(Token::Ident(name)) => {
            let field = match name.as_str() {
                "path" => CatalogField::Path,
                "http_method" => CatalogField::HttpMethod,
                "summary" => CatalogField::Summary,
                other => bail!("unknown catalog field {other}"),
            };
            let op = tokens.get(*pos + 1).cloned();
            let Some(Token::Str(value)) = tokens.get(*pos + 2).cloned() else {
                bail!("expected a quoted value after {name}");
            };
            *pos += 3;
            match op {
                Some(Token::Eq) => Ok(CatalogFilter::Eq(field, value)),
                Some(Token::ILike) => Ok(CatalogFilter::ILike(field, value)),
                _ => bail!("expected '=' or ILIKE after {name}"),
            }
        }
        other => bail!("unexpected token {other:?} in filter"),
    }
}
