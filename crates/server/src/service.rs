use crate::tools::{DeleteArgs, DiscoverArgs, ExecuteArgs, GetArgs, QRadarTools, is_success};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde_json::{Value, json};

const INSTRUCTIONS: &str = "QRadar REST API access through four tools. Use qradar_discover to \
find the exact endpoint path and its parameters, qradar_get to read, qradar_execute for \
POST/PUT/PATCH on discovered endpoints only, and qradar_delete to remove resources.";

/// MCP surface over [`QRadarTools`].
#[derive(Clone)]
pub struct QRadarMcp {
    tools: QRadarTools,
    tool_router: ToolRouter<Self>,
}

impl QRadarMcp {
    #[must_use]
    pub fn new(tools: QRadarTools) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    #[must_use]
    pub fn tools(&self) -> &QRadarTools {
        &self.tools
    }

    /// `{name, description, inputSchema}` for each registered tool, sorted by name.
    #[must_use]
    pub fn tool_descriptors(&self) -> Vec<Value> {
        let mut tools = self.tool_router.list_all();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema.as_ref(),
                })
            })
            .collect()
    }
}

#[tool_router]
impl QRadarMcp {
    #[tool(description = "Fetch data from QRadar. Use for listing or retrieving resources.

Examples:
- List offenses: endpoint=\"/siem/offenses\"
- Get offense: endpoint=\"/siem/offenses/123\"
- Filter: endpoint=\"/siem/offenses\", filter=\"status=OPEN\"
- System info: endpoint=\"/system/about\"")]
    async fn qradar_get(
        &self,
        Parameters(args): Parameters<GetArgs>,
    ) -> Result<CallToolResult, McpError> {
        render(&self.tools.get(args).await)
    }

    #[tool(description = "Delete resources from QRadar.

Examples:
- Delete from reference set: endpoint=\"/reference_data/sets/blocked_ips/1.2.3.4\"
- Delete saved search: endpoint=\"/ariel/saved_searches/123\"")]
    async fn qradar_delete(
        &self,
        Parameters(args): Parameters<DeleteArgs>,
    ) -> Result<CallToolResult, McpError> {
        render(&self.tools.delete(args).await)
    }

    #[tool(description = "Find QRadar API endpoints and get their EXACT schema. ALWAYS use this \
before qradar_execute.

Returns the exact endpoint path (DO NOT GUESS), parameters grouped by location with types, and \
the request body sample when one is needed.

Examples:
- Find user endpoints: search=\"user\", method=\"POST\"
- Find reference data: search=\"reference_data/sets\", method=\"POST\"")]
    async fn qradar_discover(
        &self,
        Parameters(args): Parameters<DiscoverArgs>,
    ) -> Result<CallToolResult, McpError> {
        render(&self.tools.discover(args).await)
    }

    #[tool(description = "Execute POST/PUT/PATCH requests. ONLY use endpoints returned by \
qradar_discover; the endpoint is checked against the catalog before anything is sent.

Examples:
- Run AQL: method=\"POST\", endpoint=\"/ariel/searches\", params={\"query_expression\": \"...\"}
- Add to set: method=\"POST\", endpoint=\"/reference_data/sets/blocked_ips\", body={\"value\": \"1.2.3.4\"}")]
    async fn qradar_execute(
        &self,
        Parameters(args): Parameters<ExecuteArgs>,
    ) -> Result<CallToolResult, McpError> {
        render(&self.tools.execute(args).await)
    }
}

#[tool_handler]
impl ServerHandler for QRadarMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

fn render(envelope: &Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(envelope)
        .map_err(|e| McpError::internal_error(format!("serialize tool result: {e}"), None))?;
    let content = vec![Content::text(text)];
    if is_success(envelope) {
        Ok(CallToolResult::success(content))
    } else {
        Ok(CallToolResult::error(content))
    }
}
