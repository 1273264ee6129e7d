//! ovenwatch-ingress — the seam between live traffic and the telemetry
//! pipeline.
//!
//! [`Telemetry`] is the single facade the rest of the service talks to: it
//! accepts the inbound event contract (request lifecycle, auth outcomes,
//! user sessions, pizza order outcomes, database queries, factory calls,
//! unhandled exceptions) and fans each event out to the aggregator or the
//! log shipper. [`middleware::track_requests`] hooks it into the axum
//! request lifecycle.

pub mod middleware;

use std::sync::Arc;

use serde_json::Value;

use ovenwatch_logship::LogShipper;
use ovenwatch_metrics::Aggregator;

pub use middleware::track_requests;

/// Shared handle to the telemetry pipeline. Cheap to clone; all clones
/// feed the same aggregator and shipper.
#[derive(Clone)]
pub struct Telemetry {
    aggregator: Arc<Aggregator>,
    shipper: LogShipper,
}

impl Telemetry {
    pub fn new(aggregator: Arc<Aggregator>, shipper: LogShipper) -> Self {
        Self { aggregator, shipper }
    }

    /// The aggregator behind this handle (for the exporter and tests).
    pub fn aggregator(&self) -> Arc<Aggregator> {
        self.aggregator.clone()
    }

    /// An inbound request has arrived.
    pub fn on_request_start(&self, method: &str, _path: &str) {
        self.aggregator.record_request(method);
    }

    /// A response is about to be sent for a completed request.
    pub fn on_request_complete(
        &self,
        status_code: u16,
        has_auth_header: bool,
        method: &str,
        path: &str,
        request_body: &str,
        response_body: &str,
    ) {
        self.shipper.log_http_transaction(
            has_auth_header,
            path,
            method,
            status_code,
            request_body,
            response_body,
        );
    }

    /// A credential check finished.
    pub fn on_auth_result(&self, success: bool) {
        self.aggregator.record_auth_attempt(success);
    }

    /// A user logged in.
    pub fn on_user_session_start(&self, user_id: &str) {
        self.aggregator.add_active_user(user_id);
    }

    /// A user logged out.
    pub fn on_user_session_end(&self, user_id: &str) {
        self.aggregator.remove_active_user(user_id);
    }

    /// A pizza order finished (successfully or not).
    pub fn on_pizza_order_outcome(&self, price: f64, latency_secs: Option<f64>, success: bool) {
        self.aggregator.record_pizza_outcome(price, latency_secs, success);
    }

    /// The persistence layer ran a query.
    pub fn on_database_query(&self, query: &str) {
        self.shipper.log_database_query(query);
    }

    /// The downstream pizza factory was called.
    pub fn on_downstream_factory_call(&self, payload: Value) {
        self.shipper.log_factory_call(payload);
    }

    /// An exception escaped a handler.
    pub fn on_unhandled_exception(&self, payload: Value) {
        self.shipper.log_exception(payload);
    }
}
