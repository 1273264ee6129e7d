//! Middleware transparency tests: the response must pass through
//! untouched while counters and the HTTP transaction log fire.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tokio::sync::mpsc;
use tower::ServiceExt;

use ovenwatch_core::SinkError;
use ovenwatch_ingress::{Telemetry, track_requests};
use ovenwatch_logship::{LogShipper, LogSink, LokiPush};
use ovenwatch_metrics::Aggregator;

struct ChannelSink {
    tx: mpsc::UnboundedSender<LokiPush>,
}

#[async_trait]
impl LogSink for ChannelSink {
    async fn push(&self, batch: LokiPush) -> Result<(), SinkError> {
        let _ = self.tx.send(batch);
        Ok(())
    }
}

fn telemetry() -> (Telemetry, mpsc::UnboundedReceiver<LokiPush>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shipper = LogShipper::new("pizza-service", Arc::new(ChannelSink { tx }));
    (Telemetry::new(Arc::new(Aggregator::new()), shipper), rx)
}

fn app(telemetry: Telemetry) -> Router {
    Router::new()
        .route("/api/order", post(|| async { (StatusCode::OK, "order created") }))
        .route(
            "/api/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .layer(from_fn_with_state(telemetry, track_requests))
}

async fn next_push(rx: &mut mpsc::UnboundedReceiver<LokiPush>) -> LokiPush {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("log event not emitted")
        .expect("channel closed")
}

#[tokio::test]
async fn response_passes_through_unchanged() {
    let (telemetry, mut rx) = telemetry();
    let aggregator = telemetry.aggregator();

    let request = Request::builder()
        .method("POST")
        .uri("/api/order")
        .header(header::AUTHORIZATION, "Bearer token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"franchiseId":1,"items":[],"password":"secret123"}"#,
        ))
        .unwrap();

    let response = app(telemetry).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"order created");

    // Counters advanced.
    let snapshot = aggregator.snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.requests_by_method.post, 1);

    // One http log event with the captured transaction, redacted.
    let push = next_push(&mut rx).await;
    let payload: serde_json::Value =
        serde_json::from_str(&push.streams[0].values[0][1]).unwrap();
    assert_eq!(payload["method"], "POST");
    assert_eq!(payload["path"], "/api/order");
    assert_eq!(payload["statusCode"], 200);
    assert_eq!(payload["authorized"], true);
    assert_eq!(payload["reqBody"]["password"], "*****");
    assert_eq!(payload["resBody"], "order created");
    assert!(!push.streams[0].values[0][1].contains("secret123"));
}

#[tokio::test]
async fn unrecognized_method_counts_only_toward_total() {
    let (telemetry, _rx) = telemetry();
    let aggregator = telemetry.aggregator();

    let request = Request::builder()
        .method("PATCH")
        .uri("/api/order")
        .body(Body::empty())
        .unwrap();
    let response = app(telemetry).oneshot(request).await.unwrap();
    // No PATCH route; the middleware still counted the request.
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let snapshot = aggregator.snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.requests_by_method.post, 0);
    assert_eq!(snapshot.requests_by_method.get, 0);
}

#[tokio::test]
async fn server_error_logs_at_error_level_and_passes_through() {
    let (telemetry, mut rx) = telemetry();

    let request = Request::builder()
        .method("GET")
        .uri("/api/broken")
        .body(Body::empty())
        .unwrap();
    let response = app(telemetry).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"boom");

    let push = next_push(&mut rx).await;
    assert_eq!(push.streams[0].stream.level, ovenwatch_logship::LogLevel::Error);
    assert_eq!(push.streams[0].stream.kind, ovenwatch_logship::LogKind::Http);
}
