//! Domain types exchanged between the aggregator, exporter, and log shipper.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// A single metric observation value.
///
/// The variant matters on the wire: counters render as bare integers,
/// gauges as floats, and text values verbatim. Average pizza-creation
/// latency is `Count(0)` when no samples exist but a 2-decimal `Text`
/// (e.g. `"0.10"`) otherwise; downstream consumers branch on that
/// distinction, so it is preserved rather than normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Gauge(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(v) => write!(f, "{v}"),
            MetricValue::Gauge(v) => write!(f, "{v}"),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

/// Request counts for the four tracked HTTP methods.
///
/// Requests with any other method only count toward the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodCounts {
    pub get: u64,
    pub post: u64,
    pub put: u64,
    pub delete: u64,
}

/// Authentication attempt counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuthCounts {
    pub successful: u64,
    pub failed: u64,
}

/// Pizza sale aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PizzaStats {
    /// Sale attempts recorded (successful or not).
    pub sold: u64,
    /// Sum of all attempted sale prices.
    pub revenue: f64,
    /// Mean creation latency; see [`MetricValue`] for the shape.
    pub avg_latency: MetricValue,
    /// Creation attempts that failed.
    pub creation_failures: u64,
}

/// Instantaneous view of the aggregator, produced fresh each export cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub requests_by_method: MethodCounts,
    pub auth: AuthCounts,
    /// Size of the active-user membership set.
    pub active_users: u64,
    pub pizzas: PizzaStats,
}

/// One line-protocol observation bound for the metrics collector.
///
/// Renders as `<prefix>,source=<source> <name>=<value> <timestamp_nanos>`
/// and is consumed exactly once by the sink.
#[derive(Debug, Clone)]
pub struct ExportRecord {
    pub prefix: &'static str,
    pub source: String,
    pub name: &'static str,
    pub value: MetricValue,
    pub timestamp_nanos: u64,
}

impl ExportRecord {
    /// Render the line-protocol form of this record.
    pub fn to_line(&self) -> String {
        format!(
            "{},source={} {}={} {}",
            self.prefix, self.source, self.name, self.value, self.timestamp_nanos
        )
    }
}

/// Current wall-clock time as nanoseconds since the Unix epoch.
///
/// Millisecond resolution scaled by 1_000_000; the sub-millisecond digits
/// are synthetic, matching what the collector and log sink expect.
pub fn timestamp_nanos() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    millis * 1_000_000
}
