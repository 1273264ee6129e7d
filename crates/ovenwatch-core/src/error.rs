//! Error types shared across the telemetry pipeline.

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading the telemetry configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors produced by a metric or log sink transmission.
///
/// Sinks never escalate these past the task that dispatched the send;
/// they exist so the dispatcher can log what went wrong.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The request never completed (connect failure, timeout, DNS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The sink answered with a non-success HTTP status.
    #[error("sink responded with status {0}")]
    Status(u16),
}
