//! Metric sinks — where export records go.
//!
//! The trait seam exists so exporter tests can count transmissions with a
//! mock; production uses [`HttpMetricSink`], which POSTs one line-protocol
//! record per request with a bearer credential.

use std::time::Duration;

use async_trait::async_trait;

use ovenwatch_core::{ExportRecord, MetricsEndpoint, SinkError};

/// Bounded timeout for outbound sends so an unreachable collector cannot
/// pile up hung connections.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Destination for export records. One call per record; a failed send is
/// dropped, never retried.
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn send(&self, record: ExportRecord) -> Result<(), SinkError>;
}

/// POSTs records to a remote collector as plaintext lines of the form
/// `<prefix>,source=<source> <name>=<value> <timestamp_nanos>`.
pub struct HttpMetricSink {
    client: reqwest::Client,
    url: String,
    bearer: String,
}

impl HttpMetricSink {
    pub fn new(endpoint: &MetricsEndpoint) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: endpoint.url.clone(),
            bearer: endpoint.auth.bearer(),
        })
    }
}

#[async_trait]
impl MetricSink for HttpMetricSink {
    async fn send(&self, record: ExportRecord) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.bearer)
            .body(record.to_line())
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SinkError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
