//! Aggregator — process-wide accumulation of telemetry counters.
//!
//! Counters use atomics; the latency sample list and the active-user set
//! sit behind short-lived `std::sync::Mutex` sections. Every operation is
//! synchronous and infallible, so request handlers can record events
//! inline without awaiting or error handling.
//!
//! Consistency: each individual field is update-safe under concurrency,
//! but there is no cross-field atomicity — a concurrent reader may observe
//! `sold` bumped before the matching `revenue` addition lands.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use ovenwatch_core::{AuthCounts, MethodCounts, MetricValue, MetricsSnapshot, PizzaStats};

/// In-memory aggregate state for the telemetry pipeline.
///
/// Explicitly constructed and shared by `Arc`, never a global; separate
/// instances keep unit tests isolated.
#[derive(Debug, Default)]
pub struct Aggregator {
    total_requests: AtomicU64,
    get_requests: AtomicU64,
    post_requests: AtomicU64,
    put_requests: AtomicU64,
    delete_requests: AtomicU64,

    auth_successful: AtomicU64,
    auth_failed: AtomicU64,

    active_users: Mutex<HashSet<String>>,

    pizzas_sold: AtomicU64,
    /// Total revenue as f64 bits, updated with a CAS loop.
    revenue_bits: AtomicU64,
    /// Creation latency samples in seconds. Append-only for the process
    /// lifetime; unbounded by design (see DESIGN.md).
    latencies: Mutex<Vec<f64>>,
    creation_failures: AtomicU64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an inbound request. The total always increases; the
    /// per-method bucket only for exactly `GET`, `POST`, `PUT`, or
    /// `DELETE`. Any other method silently skips the bucket.
    pub fn record_request(&self, method: &str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let bucket = match method {
            "GET" => &self.get_requests,
            "POST" => &self.post_requests,
            "PUT" => &self.put_requests,
            "DELETE" => &self.delete_requests,
            _ => return,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an authentication attempt.
    pub fn record_auth_attempt(&self, success: bool) {
        if success {
            self.auth_successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.auth_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Add a user to the active set. Adding an already-present id is a
    /// no-op (set semantics).
    pub fn add_active_user(&self, user_id: &str) {
        let mut users = self.active_users.lock().unwrap();
        users.insert(user_id.to_string());
    }

    /// Remove a user from the active set. Removing an absent id is a no-op.
    pub fn remove_active_user(&self, user_id: &str) {
        let mut users = self.active_users.lock().unwrap();
        users.remove(user_id);
    }

    /// Record a pizza sale attempt.
    ///
    /// The sale count and revenue always advance, even on failure: a
    /// priced sale attempt occurred. The latency sample is appended only
    /// when one was measured.
    pub fn record_pizza_outcome(&self, price: f64, latency_secs: Option<f64>, success: bool) {
        self.pizzas_sold.fetch_add(1, Ordering::Relaxed);
        self.add_revenue(price);
        if let Some(latency) = latency_secs {
            self.latencies.lock().unwrap().push(latency);
        }
        if !success {
            self.creation_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Mean creation latency over all samples.
    ///
    /// Returns the numeric `Count(0)` with no samples, otherwise the
    /// 2-decimal `Text` form (e.g. `"0.10"`). Consumers branch on that
    /// type difference; do not normalize it.
    pub fn average_latency(&self) -> MetricValue {
        let samples = self.latencies.lock().unwrap();
        if samples.is_empty() {
            return MetricValue::Count(0);
        }
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        MetricValue::Text(format!("{mean:.2}"))
    }

    /// Instantaneous, non-destructive snapshot of all aggregates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            requests_by_method: MethodCounts {
                get: self.get_requests.load(Ordering::Relaxed),
                post: self.post_requests.load(Ordering::Relaxed),
                put: self.put_requests.load(Ordering::Relaxed),
                delete: self.delete_requests.load(Ordering::Relaxed),
            },
            auth: AuthCounts {
                successful: self.auth_successful.load(Ordering::Relaxed),
                failed: self.auth_failed.load(Ordering::Relaxed),
            },
            active_users: self.active_users.lock().unwrap().len() as u64,
            pizzas: PizzaStats {
                sold: self.pizzas_sold.load(Ordering::Relaxed),
                revenue: self.revenue(),
                avg_latency: self.average_latency(),
                creation_failures: self.creation_failures.load(Ordering::Relaxed),
            },
        }
    }

    /// Total revenue recorded so far.
    pub fn revenue(&self) -> f64 {
        f64::from_bits(self.revenue_bits.load(Ordering::Relaxed))
    }

    /// CAS-add on the f64 bit pattern so concurrent additions never lose
    /// an update.
    fn add_revenue(&self, price: f64) {
        let mut current = self.revenue_bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + price).to_bits();
            match self.revenue_bits.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }
}
