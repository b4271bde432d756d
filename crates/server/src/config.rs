use clap::{Parser, ValueEnum};
use qradar_client::QRadarConfig;
use qradar_client::config::{DEFAULT_API_VERSION, DEFAULT_TIMEOUT_SECS, parse_flag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "qradar-mcp-server",
    version,
    about = "MCP server for the QRadar REST API"
)]
pub struct Config {
    /// Serve MCP over stdin/stdout instead of HTTP.
    #[arg(long)]
    pub stdio: bool,

    /// HTTP listen address.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value_t = 8001)]
    pub port: u16,

    /// QRadar console URL, e.g. https://qradar.example.com
    #[arg(long, env = "QRADAR_HOST", default_value = "")]
    pub qradar_host: String,

    /// Authorized service token, sent as the SEC header.
    #[arg(long, env = "QRADAR_API_TOKEN", default_value = "", hide_env_values = true)]
    pub qradar_token: String,

    #[arg(long, env = "QRADAR_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub qradar_api_version: String,

    /// Verify the console TLS certificate (true/1/yes/on).
    #[arg(
        long,
        env = "QRADAR_VERIFY_SSL",
        default_value = "false",
        action = clap::ArgAction::Set,
        value_parser = parse_bool_flag
    )]
    pub qradar_verify_ssl: bool,

    /// Per-request timeout in seconds (0 disables it).
    #[arg(long, env = "QRADAR_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub qradar_timeout_secs: u64,

    /// Bearer key required on every HTTP route except /health. Empty disables auth.
    #[arg(long, env = "MCP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Default log filter; RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    #[must_use]
    pub fn qradar_config(&self) -> QRadarConfig {
        let mut cfg = QRadarConfig::new(self.qradar_host.as_str(), self.qradar_token.as_str());
        cfg.api_version.clone_from(&self.qradar_api_version);
        cfg.verify_ssl = self.qradar_verify_ssl;
        cfg.timeout_secs = self.qradar_timeout_secs;
        cfg
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool_flag(raw: &str) -> Result<bool, String> {
    Ok(parse_flag(raw))
}
