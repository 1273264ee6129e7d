//! ovenwatch-metrics — the metrics half of the telemetry pipeline.
//!
//! # Architecture
//!
//! ```text
//! Aggregator                      Sampler
//!   ├── record_request()            ├── cpu_usage_percent()
//!   ├── record_auth_attempt()      └── memory_usage_percent()
//!   ├── add/remove_active_user()
//!   ├── record_pizza_outcome()
//!   └── snapshot()
//!         │
//!         ▼
//! Exporter ── start()/stop() ── periodic cycle ──▶ MetricSink (14 records)
//! ```
//!
//! The aggregator is the only shared mutable state; all of its operations
//! are synchronous, infallible, and I/O-free so the request path can call
//! them without blocking. The exporter runs on its own background task and
//! never touches the request path.

pub mod aggregator;
pub mod exporter;
pub mod sampler;
pub mod sink;

pub use aggregator::Aggregator;
pub use exporter::Exporter;
pub use sampler::Sampler;
pub use sink::{HttpMetricSink, MetricSink};
