//! Telemetry configuration, loaded from a TOML file.
//!
//! ```toml
//! component = "pizza-service"
//!
//! [metrics]
//! url = "https://collector.example.com/api/v1/push"
//! user_id = "123456"
//! api_key = "glc_..."
//! interval_secs = 10
//!
//! [logging]
//! url = "https://logs.example.com/loki/api/v1/push"
//! user_id = "654321"
//! api_key = "glc_..."
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigResult;

/// Top-level telemetry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Source/component label stamped onto every metric and log stream.
    pub component: String,
    /// Remote metrics collector.
    pub metrics: MetricsEndpoint,
    /// Remote log-aggregation endpoint.
    pub logging: LoggingEndpoint,
}

/// Bearer credential pair for a remote sink.
///
/// The wire convention is `Authorization: Bearer <user_id>:<api_key>`.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkAuth {
    pub user_id: String,
    pub api_key: String,
}

impl SinkAuth {
    /// The bearer token as it appears on the wire.
    pub fn bearer(&self) -> String {
        format!("{}:{}", self.user_id, self.api_key)
    }
}

/// Metrics collector endpoint and export cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsEndpoint {
    pub url: String,
    #[serde(flatten)]
    pub auth: SinkAuth,
    /// Export interval in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

/// Log-aggregation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingEndpoint {
    pub url: String,
    #[serde(flatten)]
    pub auth: SinkAuth,
}

fn default_interval_secs() -> u64 {
    10
}

impl TelemetryConfig {
    /// Load the configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse the configuration from a TOML string.
    pub fn from_toml(raw: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(raw)?)
    }
}
