//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mixed_requests_total` (counter): requests by outcome, method, status
//! - `mixed_request_duration_seconds` (histogram): latency by outcome
//! - `mixed_host_rejections_total` (counter): path segments that failed
//!   host validation, by reason
//!
//! Without an installed recorder every call is a no-op, so tests and
//! metrics-disabled deployments pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Outcome label for requests answered from the root directory.
pub const OUTCOME_LOCAL: &str = "local";
/// Outcome label for forwarded requests.
pub const OUTCOME_PROXY: &str = "proxy";

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(outcome: &'static str, method: &Method, status: u16, start: Instant) {
    metrics::counter!(
        "mixed_requests_total",
        "outcome" => outcome,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("mixed_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a leading path segment that was not a valid host.
pub fn record_host_rejected(reason: &'static str) {
    metrics::counter!("mixed_host_rejections_total", "reason" => reason).increment(1);
}
