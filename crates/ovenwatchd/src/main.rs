//! ovenwatchd — demo daemon for the ovenwatch telemetry pipeline.
//!
//! Assembles the full pipeline the way a real pizza service would:
//! - Aggregator (shared counter state)
//! - Exporter (periodic line-protocol flush to the metrics collector)
//! - Log shipper (redacting Loki pushes)
//! - Telemetry facade + request-tracking middleware
//!
//! The HTTP routes are thin simulations that exercise the inbound event
//! contract; the real service's routers, database, and auth live outside
//! this repository.
//!
//! # Usage
//!
//! ```text
//! ovenwatchd --config ovenwatch.toml --port 3000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use ovenwatch_core::TelemetryConfig;
use ovenwatch_ingress::{Telemetry, track_requests};
use ovenwatch_logship::{HttpLogSink, LogShipper};
use ovenwatch_metrics::{Aggregator, Exporter, HttpMetricSink, Sampler};

#[derive(Parser)]
#[command(name = "ovenwatchd", about = "Pizza-service telemetry demo daemon")]
struct Cli {
    /// Path to the telemetry config file.
    #[arg(long, default_value = "ovenwatch.toml")]
    config: PathBuf,

    /// Port to listen on.
    #[arg(long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ovenwatch=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = TelemetryConfig::from_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // ── Assemble the pipeline ──────────────────────────────────

    let aggregator = Arc::new(Aggregator::new());

    let metric_sink = Arc::new(HttpMetricSink::new(&config.metrics)?);
    let exporter = Exporter::new(
        aggregator.clone(),
        Sampler::new(),
        metric_sink,
        config.component.clone(),
    );
    exporter.start(Duration::from_secs(config.metrics.interval_secs));
    info!(
        interval_secs = config.metrics.interval_secs,
        "metrics exporter started"
    );

    let log_sink = Arc::new(HttpLogSink::new(&config.logging)?);
    let shipper = LogShipper::new(config.component.clone(), log_sink);
    let telemetry = Telemetry::new(aggregator, shipper);

    let app = demo_router(telemetry.clone())
        .layer(axum::middleware::from_fn_with_state(telemetry, track_requests));

    // ── Serve ──────────────────────────────────────────────────

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, component = %config.component, "demo service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    exporter.stop();
    info!("ovenwatchd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

/// Demo routes exercising the inbound event contract.
fn demo_router(telemetry: Telemetry) -> Router {
    Router::new()
        .route("/api/auth", put(login).delete(logout))
        .route("/api/order", post(create_order))
        .route("/api/order/menu", get(menu))
        .with_state(telemetry)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(telemetry): State<Telemetry>,
    Json(login): Json<LoginRequest>,
) -> (StatusCode, Json<Value>) {
    // Simulated credential check: any non-empty password passes.
    let success = !login.password.is_empty();
    telemetry.on_auth_result(success);

    if success {
        telemetry.on_user_session_start(&login.email);
        (StatusCode::OK, Json(json!({ "message": "login ok" })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "unauthorized" })),
        )
    }
}

#[derive(Deserialize)]
struct LogoutRequest {
    email: String,
}

async fn logout(
    State(telemetry): State<Telemetry>,
    Json(logout): Json<LogoutRequest>,
) -> Json<Value> {
    telemetry.on_user_session_end(&logout.email);
    Json(json!({ "message": "logout ok" }))
}

#[derive(Deserialize)]
struct OrderRequest {
    description: String,
    price: f64,
}

async fn create_order(
    State(telemetry): State<Telemetry>,
    Json(order): Json<OrderRequest>,
) -> (StatusCode, Json<Value>) {
    if !order.price.is_finite() || order.price < 0.0 {
        telemetry.on_unhandled_exception(json!({
            "message": "invalid order price",
            "price": order.price.to_string(),
        }));
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "order failed" })),
        );
    }

    telemetry.on_database_query("INSERT INTO orders (description, price) VALUES (?, ?)");

    // Simulated factory round trip, timed for the latency sample.
    let started = Instant::now();
    let factory_request = json!({
        "description": order.description,
        "price": order.price,
    });
    let factory_response = json!({ "reply": "order queued" });
    telemetry.on_downstream_factory_call(json!({
        "request": factory_request,
        "response": factory_response,
    }));
    let latency = started.elapsed().as_secs_f64();

    // Zero-priced orders simulate a factory rejection; the sale attempt
    // still counts toward sold/revenue.
    let success = order.price > 0.0;
    telemetry.on_pizza_order_outcome(order.price, Some(latency), success);

    if success {
        (StatusCode::OK, Json(json!({ "status": "created" })))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "status": "rejected" })))
    }
}

async fn menu(State(telemetry): State<Telemetry>) -> Json<Value> {
    telemetry.on_database_query("SELECT * FROM menu");
    Json(json!([
        { "id": 1, "title": "Margherita", "price": 8.5 },
        { "id": 2, "title": "Pepperoni", "price": 9.5 },
        { "id": 3, "title": "Veggie", "price": 9.0 },
    ]))
}
