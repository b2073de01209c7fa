//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Record one sample per dispatched request
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by method, outcome
//! - `dispatch_request_duration_seconds` (histogram): dispatch latency
//!
//! # Design Decisions
//! - Labels are bounded: method and outcome only, never the path
//! - Recording without an installed exporter is a cheap no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::dispatch::Outcome;

pub const REQUESTS_TOTAL: &str = "dispatch_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "dispatch_request_duration_seconds";

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request that started at `start`.
pub fn record_request(method: &str, outcome: Outcome, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();

    ::metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    ::metrics::histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .record(elapsed);
}
