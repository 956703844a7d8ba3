//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by method, route, status
//! - `router_request_duration_seconds` (histogram): dispatch latency by method, route
//! - `router_binding_failures_total` (counter): binding failures by route, parameter, kind
//! - `router_not_found_total` (counter): requests no route matched, by method
//!
//! # Design Decisions
//! - Route label is the canonical template, never the raw path, to keep
//!   cardinality bounded
//! - Exporter is optional; without it the macros record nothing

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "router_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "router_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected during parameter binding.
pub fn record_binding_failure(route: &str, parameter: &str, kind: &'static str) {
    counter!(
        "router_binding_failures_total",
        "route" => route.to_string(),
        "parameter" => parameter.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// Record a request that matched no route.
pub fn record_not_found(method: &str) {
    counter!("router_not_found_total", "method" => method.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        record_request("GET", "licenses/{id}", 200, Instant::now());
        record_binding_failure("PUT item/{number}", "number", "conversion");
        record_not_found("DELETE");
    }
}
