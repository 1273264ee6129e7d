//! Log shipper — builds, sanitizes, and dispatches one log batch per
//! event.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use ovenwatch_core::timestamp_nanos;

use crate::redact::mask_passwords;
use crate::sink::LogSink;

/// Severity of a shipped log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Category of a shipped log event.
///
/// `Database` serializes as `"db"`, matching what the log sink's
/// dashboards already key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Http,
    #[serde(rename = "db")]
    Database,
    Factory,
    Exception,
}

/// Loki push-API envelope: one stream with one timestamped value.
#[derive(Debug, Clone, Serialize)]
pub struct LokiPush {
    pub streams: Vec<LokiStream>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LokiStream {
    pub stream: StreamLabels,
    /// `[timestamp_nanos as string, serialized sanitized payload]` pairs.
    pub values: Vec<[String; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamLabels {
    pub component: String,
    pub level: LogLevel,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

/// Ships structured log events to the log-aggregation endpoint.
///
/// Cheap to clone; all clones share one sink.
#[derive(Clone)]
pub struct LogShipper {
    component: String,
    sink: Arc<dyn LogSink>,
}

impl LogShipper {
    pub fn new(component: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            component: component.into(),
            sink,
        }
    }

    /// Log one completed HTTP transaction. Level derives from the status
    /// code: 5xx is an error, 4xx a warning, everything else info.
    ///
    /// Request and response bodies are parsed as JSON when possible so
    /// credentials inside them are structurally redacted; non-JSON bodies
    /// are carried as plain strings.
    pub fn log_http_transaction(
        &self,
        has_auth_header: bool,
        path: &str,
        method: &str,
        status_code: u16,
        request_body: &str,
        response_body: &str,
    ) {
        let payload = json!({
            "authorized": has_auth_header,
            "path": path,
            "method": method,
            "statusCode": status_code,
            "reqBody": body_value(request_body),
            "resBody": body_value(response_body),
        });
        self.emit(status_to_level(status_code), LogKind::Http, payload);
    }

    /// Log a database query.
    pub fn log_database_query(&self, query: &str) {
        self.emit(LogLevel::Info, LogKind::Database, Value::String(query.to_string()));
    }

    /// Log a call to the downstream pizza factory.
    pub fn log_factory_call(&self, payload: Value) {
        self.emit(LogLevel::Info, LogKind::Factory, payload);
    }

    /// Log an unhandled exception.
    pub fn log_exception(&self, payload: Value) {
        self.emit(LogLevel::Error, LogKind::Exception, payload);
    }

    /// Sanitize, wrap, and dispatch on a spawned task. The caller returns
    /// immediately; a failed send is logged locally and dropped.
    fn emit(&self, level: LogLevel, kind: LogKind, payload: Value) {
        let sanitized = mask_passwords(payload);
        let push = LokiPush {
            streams: vec![LokiStream {
                stream: StreamLabels {
                    component: self.component.clone(),
                    level,
                    kind,
                },
                values: vec![[timestamp_nanos().to_string(), sanitized.to_string()]],
            }],
        };

        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.push(push).await {
                debug!(error = %e, "log shipment failed");
            }
        });
    }
}

fn status_to_level(status_code: u16) -> LogLevel {
    match status_code {
        500.. => LogLevel::Error,
        400..=499 => LogLevel::Warn,
        _ => LogLevel::Info,
    }
}

/// Parse a body as JSON when possible so redaction sees its structure.
fn body_value(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ovenwatch_core::SinkError;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ChannelSink {
        tx: mpsc::UnboundedSender<LokiPush>,
        fail: bool,
    }

    #[async_trait]
    impl LogSink for ChannelSink {
        async fn push(&self, batch: LokiPush) -> Result<(), SinkError> {
            let _ = self.tx.send(batch);
            if self.fail {
                return Err(SinkError::Status(502));
            }
            Ok(())
        }
    }

    fn shipper(fail: bool) -> (LogShipper, mpsc::UnboundedReceiver<LokiPush>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shipper = LogShipper::new("pizza-service", Arc::new(ChannelSink { tx, fail }));
        (shipper, rx)
    }

    async fn next_push(rx: &mut mpsc::UnboundedReceiver<LokiPush>) -> LokiPush {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("push not dispatched")
            .expect("channel closed")
    }

    #[test]
    fn status_maps_to_level() {
        assert_eq!(status_to_level(200), LogLevel::Info);
        assert_eq!(status_to_level(302), LogLevel::Info);
        assert_eq!(status_to_level(404), LogLevel::Warn);
        assert_eq!(status_to_level(500), LogLevel::Error);
        assert_eq!(status_to_level(503), LogLevel::Error);
    }

    #[tokio::test]
    async fn http_transaction_builds_one_sanitized_stream() {
        let (shipper, mut rx) = shipper(false);
        shipper.log_http_transaction(
            true,
            "/api/auth",
            "PUT",
            200,
            r#"{"email":"a@b.com","password":"secret123"}"#,
            r#"{"token":"abc"}"#,
        );

        let push = next_push(&mut rx).await;
        assert_eq!(push.streams.len(), 1);
        let stream = &push.streams[0];
        assert_eq!(stream.stream.component, "pizza-service");
        assert_eq!(stream.stream.level, LogLevel::Info);
        assert_eq!(stream.stream.kind, LogKind::Http);
        assert_eq!(stream.values.len(), 1);

        let [timestamp, payload] = &stream.values[0];
        assert!(timestamp.parse::<u64>().is_ok());
        assert!(!payload.contains("secret123"));
        assert!(payload.contains("*****"));
        assert!(payload.contains("\"path\":\"/api/auth\""));
    }

    #[tokio::test]
    async fn error_status_ships_at_error_level() {
        let (shipper, mut rx) = shipper(false);
        shipper.log_http_transaction(false, "/api/order", "POST", 500, "{}", "{}");
        let push = next_push(&mut rx).await;
        assert_eq!(push.streams[0].stream.level, LogLevel::Error);
    }

    #[tokio::test]
    async fn database_query_ships_as_db_kind() {
        let (shipper, mut rx) = shipper(false);
        shipper.log_database_query("SELECT * FROM menu");

        let push = next_push(&mut rx).await;
        assert_eq!(push.streams[0].stream.kind, LogKind::Database);
        // The kind label serializes as "db" on the wire.
        let wire = serde_json::to_value(&push).unwrap();
        assert_eq!(wire["streams"][0]["stream"]["type"], "db");
        assert_eq!(
            push.streams[0].values[0][1],
            "\"SELECT * FROM menu\""
        );
    }

    #[tokio::test]
    async fn exception_payload_is_redacted() {
        let (shipper, mut rx) = shipper(false);
        shipper.log_exception(serde_json::json!({
            "message": "login failed",
            "context": {"password": "secret123"}
        }));

        let push = next_push(&mut rx).await;
        assert!(!push.streams[0].values[0][1].contains("secret123"));
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let (shipper, mut rx) = shipper(true);
        shipper.log_factory_call(serde_json::json!({"order": 1}));
        // The send fails inside the spawned task; the caller never sees it.
        let _ = next_push(&mut rx).await;
        tokio::task::yield_now().await;
    }
}
