//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, route, status
//! - `api_request_duration_seconds` (histogram): latency by method, route
//! - `store_mutations_total` (counter): mutations by collection, op
//! - `store_persist_total` (counter): document writes by result
//! - `store_persist_bytes` (histogram): size of written documents

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request. `route` is the matched template or `none`.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    ::metrics::counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "api_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_mutation(collection: &str, op: &'static str) {
    ::metrics::counter!(
        "store_mutations_total",
        "collection" => collection.to_string(),
        "op" => op
    )
    .increment(1);
}

pub fn record_persist(ok: bool, bytes: usize) {
    let result = if ok { "ok" } else { "error" };
    ::metrics::counter!("store_persist_total", "result" => result).increment(1);
    ::metrics::histogram!("store_persist_bytes").record(bytes as f64);
}
