//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method and status
//! - `proxy_request_duration_seconds` (histogram): time to upstream response headers
//! - `proxy_errors_total` (counter): contained failures by kind
//! - `proxy_removed_headers_total` (counter): headers stripped before forwarding
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Extension methods share the `other` label so callers cannot grow the series count
//! - The Prometheus exporter runs its own HTTP listener on a separate address

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and start the scrape endpoint.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Metric label for a request method: the standard methods by name,
/// everything else as `other`.
pub fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "CONNECT" => "CONNECT",
        "OPTIONS" => "OPTIONS",
        "TRACE" => "TRACE",
        "PATCH" => "PATCH",
        _ => "other",
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method_label(method);
    let status = status.to_string();
    counter!(
        "proxy_requests_total",
        "method" => method,
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "proxy_request_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a failure converted into a 500.
pub fn record_error(kind: &'static str) {
    counter!("proxy_errors_total", "kind" => kind).increment(1);
}

/// Record headers stripped from one request.
pub fn record_removed_headers(count: usize) {
    if count > 0 {
        counter!("proxy_removed_headers_total").increment(count as u64);
    }
}
