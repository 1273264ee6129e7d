//! Log sinks — where sanitized log batches go.

use std::time::Duration;

use async_trait::async_trait;

use ovenwatch_core::{LoggingEndpoint, SinkError};

use crate::shipper::LokiPush;

/// Bounded timeout for outbound sends so an unreachable log endpoint
/// cannot pile up hung connections.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Destination for log batches. One call per event; a failed push is
/// dropped, never retried.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn push(&self, batch: LokiPush) -> Result<(), SinkError>;
}

/// POSTs batches as JSON to a Loki-compatible push endpoint with a bearer
/// credential.
pub struct HttpLogSink {
    client: reqwest::Client,
    url: String,
    bearer: String,
}

impl HttpLogSink {
    pub fn new(endpoint: &LoggingEndpoint) -> Result<Self, SinkError> {
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
impl LogSink for HttpLogSink {
    async fn push(&self, batch: LokiPush) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.bearer)
            .json(&batch)
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SinkError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
