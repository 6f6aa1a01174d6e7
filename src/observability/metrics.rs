//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pdf_conversions_total` (counter): conversions by outcome
//! - `pdf_conversion_duration_seconds` (histogram): capture → converter response
//! - `gateway_requests_total` (counter): proxied requests by method, status
//! - `gateway_request_duration_seconds` (histogram): upstream latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished conversion attempt.
pub fn record_conversion(outcome: &'static str, started: Instant) {
    metrics::counter!("pdf_conversions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("pdf_conversion_duration_seconds", "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}

/// Record one request forwarded to the upstream origin.
pub fn record_request(method: &str, status: u16, started: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(started.elapsed().as_secs_f64());
}
