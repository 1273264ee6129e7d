//! Exporter — periodic background task that flushes aggregator and
//! sampler readings to the metrics collector.
//!
//! Two states: stopped (initial) and running. `start` spawns the export
//! loop; `start` while already running is a logged no-op so a double call
//! can never produce duplicate export storms. `stop` signals the loop and
//! clears the handle; `stop` while stopped is a no-op. Stopping cancels
//! only future cycles — sends already dispatched finish on their own
//! tasks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use ovenwatch_core::{ExportRecord, MetricValue, MetricsSnapshot, timestamp_nanos};

use crate::aggregator::Aggregator;
use crate::sampler::Sampler;
use crate::sink::MetricSink;

/// Periodically snapshots the aggregator and sampler and transmits one
/// record per named metric (14 per cycle) to the sink.
pub struct Exporter {
    aggregator: Arc<Aggregator>,
    sampler: Sampler,
    sink: Arc<dyn MetricSink>,
    source: String,
    /// Shutdown sender for the running export loop, if any.
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl Exporter {
    pub fn new(
        aggregator: Arc<Aggregator>,
        sampler: Sampler,
        sink: Arc<dyn MetricSink>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            aggregator,
            sampler,
            sink,
            source: source.into(),
            shutdown: Mutex::new(None),
        }
    }

    /// Start the export loop. A no-op (with a warning) if already running.
    pub fn start(&self, interval: Duration) {
        let mut shutdown = self.shutdown.lock().unwrap();
        if shutdown.is_some() {
            warn!("exporter already running; start ignored");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let aggregator = self.aggregator.clone();
        let sampler = self.sampler;
        let sink = self.sink.clone();
        let source = self.source.clone();

        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs_f64(), "exporter started");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        export_cycle(&aggregator, sampler, &sink, &source);
                    }
                    _ = shutdown_rx.changed() => {
                        info!("exporter shutting down");
                        break;
                    }
                }
            }
        });

        *shutdown = Some(shutdown_tx);
    }

    /// Stop the export loop. A no-op if already stopped.
    pub fn stop(&self) {
        let mut shutdown = self.shutdown.lock().unwrap();
        match shutdown.take() {
            Some(shutdown_tx) => {
                let _ = shutdown_tx.send(true);
            }
            None => debug!("exporter already stopped; stop ignored"),
        }
    }

    /// Whether the export loop is currently running.
    pub fn is_running(&self) -> bool {
        self.shutdown.lock().unwrap().is_some()
    }
}

/// One export cycle: snapshot, build the 14 records, and dispatch each on
/// its own task. A failed transmission is logged and dropped; it never
/// blocks the other records or the next cycle.
fn export_cycle(aggregator: &Aggregator, sampler: Sampler, sink: &Arc<dyn MetricSink>, source: &str) {
    let snapshot = aggregator.snapshot();
    let cpu = sampler.cpu_usage_percent();
    let memory = sampler.memory_usage_percent();

    for record in build_records(&snapshot, cpu, memory, source) {
        let sink = sink.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.send(record.clone()).await {
                warn!(error = %e, line = %record.to_line(), "metric transmission failed");
            }
        });
    }
}

/// The fixed set of 14 records emitted each cycle.
fn build_records(
    snapshot: &MetricsSnapshot,
    cpu: f64,
    memory: f64,
    source: &str,
) -> Vec<ExportRecord> {
    let ts = timestamp_nanos();
    let record = |prefix: &'static str, name: &'static str, value: MetricValue| ExportRecord {
        prefix,
        source: source.to_string(),
        name,
        value,
        timestamp_nanos: ts,
    };

    vec![
        record("osMetric", "cpu_percentage", MetricValue::Gauge(cpu)),
        record("osMetric", "memory_percentage", MetricValue::Gauge(memory)),
        record(
            "httpMetric",
            "all_http_methods",
            MetricValue::Count(snapshot.total_requests),
        ),
        record(
            "httpMetric",
            "get_http_method",
            MetricValue::Count(snapshot.requests_by_method.get),
        ),
        record(
            "httpMetric",
            "post_http_method",
            MetricValue::Count(snapshot.requests_by_method.post),
        ),
        record(
            "httpMetric",
            "put_http_method",
            MetricValue::Count(snapshot.requests_by_method.put),
        ),
        record(
            "httpMetric",
            "delete_http_method",
            MetricValue::Count(snapshot.requests_by_method.delete),
        ),
        record(
            "pizzaMetric",
            "pizza_sold",
            MetricValue::Count(snapshot.pizzas.sold),
        ),
        record(
            "pizzaMetric",
            "pizza_revenue",
            MetricValue::Gauge(snapshot.pizzas.revenue),
        ),
        record(
            "pizzaMetric",
            "pizza_avg_latency",
            snapshot.pizzas.avg_latency.clone(),
        ),
        record(
            "pizzaMetric",
            "pizza_creation_failures",
            MetricValue::Count(snapshot.pizzas.creation_failures),
        ),
        record(
            "authMetric",
            "auth_success",
            MetricValue::Count(snapshot.auth.successful),
        ),
        record(
            "authMetric",
            "auth_failed",
            MetricValue::Count(snapshot.auth.failed),
        ),
        record(
            "userMetric",
            "active_users",
            MetricValue::Count(snapshot.active_users),
        ),
    ]
}
