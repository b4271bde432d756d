use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "26.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for one QRadar console.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QRadarConfig {
    /// Console URL, e.g. `https://qradar.example.com` (trailing `/` is trimmed).
    #[serde(default)]
    pub host: String,

    /// Authorized service token, sent as the `SEC` header.
    #[serde(default)]
    pub api_token: String,

    /// Value of the `Version` header selecting the REST API version.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Verify the console's TLS certificate. Off by default: consoles commonly use self-signed
    /// certificates.
    #[serde(default)]
    pub verify_ssl: bool,

    /// Per-request timeout in seconds. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for QRadarConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl QRadarConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            host: normalize_host(host.into()),
            api_token: api_token.into(),
            api_version: default_api_version(),
            verify_ssl: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Replace host and/or token for a single call. Empty overrides are ignored.
    #[must_use]
    pub fn with_overrides(&self, host: Option<&str>, api_token: Option<&str>) -> Self {
        let mut cfg = self.clone();
        if let Some(h) = host.filter(|h| !h.is_empty()) {
            cfg.host = normalize_host(h.to_string());
        }
        if let Some(t) = api_token.filter(|t| !t.is_empty()) {
            cfg.api_token = t.to_string();
        }
        cfg
    }

    /// `<host>/api`, or empty when no host is configured.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.is_empty() {
            String::new()
        } else {
            format!("{}/api", self.host)
        }
    }

    /// Headers attached to every QRadar request.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, &str); 4] {
        [
            ("SEC", self.api_token.as_str()),
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
            ("Version", self.api_version.as_str()),
        ]
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.api_token.is_empty()
    }
}

impl fmt::Debug for QRadarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QRadarConfig")
            .field("host", &self.host)
            .field("api_token", &if self.api_token.is_empty() { "" } else { "<redacted>" })
            .field("api_version", &self.api_version)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Parse a boolean-ish flag the way the console env vars are usually written.
#[must_use]
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn normalize_host(host: String) -> String {
    host.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_and_headers() {
        let cfg = QRadarConfig::new("https://qradar.local/", "tok");
        assert_eq!(cfg.base_url(), "https://qradar.local/api");
        assert_eq!(
            cfg.headers(),
            [
                ("SEC", "tok"),
                ("Content-Type", "application/json"),
                ("Accept", "application/json"),
                ("Version", "26.0"),
            ]
        );
        assert!(cfg.is_configured());
        assert_eq!(QRadarConfig::default().base_url(), "");
    }

    #[test]
    fn overrides_take_priority_unless_empty() {
        let cfg = QRadarConfig::new("https://a", "t1");
        let o = cfg.with_overrides(Some("https://b/"), None);
        assert_eq!(o.host, "https://b");
        assert_eq!(o.api_token, "t1");

        let o = cfg.with_overrides(Some(""), Some("t2"));
        assert_eq!(o.host, "https://a");
        assert_eq!(o.api_token, "t2");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = QRadarConfig::new("https://a", "super-secret");
        let s = format!("{cfg:?}");
        assert!(!s.contains("super-secret"));
        assert!(s.contains("<redacted>"));
    }

    #[test]
    fn flags() {
        for v in ["true", "1", "YES", "on"] {
            assert!(parse_flag(v), "{v}");
        }
        for v in ["false", "0", "", "nope"] {
            assert!(!parse_flag(v), "{v}");
        }
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg: QRadarConfig =
            serde_json::from_str(r#"{"host":"https://q","apiToken":"x"}"#).expect("parses");
        assert_eq!(cfg.api_version, "26.0");
        assert_eq!(cfg.timeout(), Some(Duration::from_secs(120)));
        assert!(!cfg.verify_ssl);
    }
}
