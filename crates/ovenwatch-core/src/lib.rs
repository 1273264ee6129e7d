//! ovenwatch-core — shared foundation for the ovenwatch telemetry pipeline.
//!
//! Holds the pieces every other crate needs: the telemetry configuration
//! (TOML-deserialized), the domain types exchanged between the aggregator,
//! exporter, and log shipper, and the error enums for config loading and
//! sink transmission.
//!
//! This crate performs no I/O beyond reading the config file and knows
//! nothing about HTTP; the sinks live in `ovenwatch-metrics` and
//! `ovenwatch-logship`.

pub mod config;
pub mod error;
pub mod types;

pub use config::{LoggingEndpoint, MetricsEndpoint, SinkAuth, TelemetryConfig};
pub use error::{ConfigError, ConfigResult, SinkError};
pub use types::*;
