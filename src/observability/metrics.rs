//! Metrics collection and exposition.
//!
//! # Metrics
//! - `composer_requests_total` (counter): requests by method, status
//! - `composer_request_duration_seconds` (histogram): end-to-end latency
//! - `composer_fragment_fetches_total` (counter): fragment fetches by status
//! - `composer_fragment_fetch_duration_seconds` (histogram): fetch latency
//! - `composer_recursion_guard_total` (counter): depth guard trips
//!
//! # Design Decisions
//! - Prometheus exposition on a dedicated listener, enabled via config
//! - Low-cardinality labels only (method, status)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address. Failure to install
/// is logged but never fatal; the gateway runs without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(error) => tracing::error!(error = %error, "failed to install metrics exporter"),
    }
}

/// Record one gateway request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "composer_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("composer_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one fragment fetch.
pub fn record_fragment_fetch(status: u16, start: Instant) {
    counter!(
        "composer_fragment_fetches_total",
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("composer_fragment_fetch_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a recursion depth guard trip.
pub fn record_recursion_guard_trip() {
    counter!("composer_recursion_guard_total").increment(1);
}
