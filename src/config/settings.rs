use std::time::Duration;

use serde::Deserialize;

use crate::parser::expiry::ExpiryResolver;
use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_TOKEN_TTL_SECS};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    /// subtracted from every resolved token expiry
    pub safety_margin_seconds: Option<u64>,
    /// token lifetime used when the server reports no usable expiry
    pub default_ttl_seconds: Option<u64>,
    /// upper bound for every HTTP call, token requests included
    pub http_timeout_ms: Option<u64>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>
}

impl SettingsConfig {
    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_seconds.unwrap_or(DEFAULT_SAFETY_MARGIN_SECS))
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS))
    }

    pub fn expiry_resolver(&self) -> ExpiryResolver {
        ExpiryResolver::new(self.safety_margin(), self.default_ttl())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: String
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_server_host(), port: default_server_port() }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> String {
    "9100".to_string()
}
