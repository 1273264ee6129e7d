//! ovenwatch-logship — structured log shipping for the telemetry pipeline.
//!
//! One discrete event per HTTP transaction, database query, downstream
//! factory call, or unhandled exception. Every payload passes through
//! structural password redaction before serialization, then ships to the
//! log-aggregation endpoint in the Loki push-API envelope on a spawned
//! task. Shipping is strictly fire-and-forget: a failed send is logged
//! locally and dropped, and can never fail or slow the originating
//! request.

pub mod redact;
pub mod shipper;
pub mod sink;

pub use redact::mask_passwords;
pub use shipper::{LogKind, LogLevel, LogShipper, LokiPush, LokiStream, StreamLabels};
pub use sink::{HttpLogSink, LogSink};
