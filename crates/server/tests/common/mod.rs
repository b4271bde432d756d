use anyhow::Context as _;
use serde_json::{Value, json};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub use qradar_test_support::{FakeQRadar, KillOnDrop, pick_unused_port, wait_http_ok};

const ENV_VARS: [&str; 6] = [
    "QRADAR_HOST",
    "QRADAR_API_TOKEN",
    "QRADAR_API_VERSION",
    "QRADAR_VERIFY_SSL",
    "QRADAR_TIMEOUT_SECS",
    "MCP_API_KEY",
];

/// Base command for the server binary with inherited console/auth env vars removed.
pub fn server_command(qradar_host: &str, token: &str) -> Command {
    let bin = env!("CARGO_BIN_EXE_qradar-mcp-server");
    let mut cmd = Command::new(bin);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--qradar-host")
        .arg(qradar_host)
        .arg("--qradar-token")
        .arg(token)
        .arg("--log-level")
        .arg("info")
        .stderr(Stdio::null());
    cmd
}

pub fn spawn_http_server(
    qradar_host: &str,
    token: &str,
    port: u16,
    api_key: Option<&str>,
) -> anyhow::Result<Child> {
    let mut cmd = server_command(qradar_host, token);
    cmd.arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg(port.to_string());
    if let Some(key) = api_key {
        cmd.arg("--api-key").arg(key);
    }
    cmd.spawn().context("spawn qradar-mcp-server")
}

/// Start the server in HTTP mode and wait for `/health`.
pub async fn start_http_server(
    qradar_host: &str,
    api_key: Option<&str>,
) -> anyhow::Result<(String, KillOnDrop)> {
    let port = pick_unused_port()?;
    let child = KillOnDrop(spawn_http_server(qradar_host, "tok", port, api_key)?);
    let base_url = format!("http://127.0.0.1:{port}");
    wait_http_ok(&format!("{base_url}/health"), Duration::from_secs(20)).await?;
    Ok((base_url, child))
}

#[allow(dead_code)]
pub fn sample_catalog() -> Vec<Value> {
    vec![
        json!({
            "http_method": "POST",
            "path": "/reference_data/sets/{name}",
            "summary": "Add or update an element in a reference set",
            "parameters": [
                {"parameter_name": "name", "type": "PATH", "required": true,
                 "description": "The name of the reference set"},
                {"parameter_name": "data", "type": "BODY", "required": true,
                 "mime_types": [{"mime_type": "application/json", "sample": "{\"value\":\"1.2.3.4\"}"}]}
            ]
        }),
        json!({
            "http_method": "GET",
            "path": "/siem/offenses",
            "summary": "List offenses",
            "parameters": [{"parameter_name": "filter", "type": "QUERY"}]
        }),
        json!({
            "http_method": "GET",
            "path": "/siem/offenses/{offense_id}",
            "summary": "Retrieve an offense",
            "parameters": [{"parameter_name": "offense_id", "type": "PATH", "required": true}]
        }),
    ]
}
