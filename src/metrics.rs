//! Prometheus metrics for request and store monitoring.
//!
//! This module provides metrics for:
//! - HTTP request latency and status codes
//! - Scan pages fetched and records decoded
//! - Store retries and failures

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

use crate::error::{AppError, Result};

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// Scan pages fetched counter metric name.
pub const METRIC_SCAN_PAGES: &str = "store_scan_pages_total";
/// Records decoded counter metric name.
pub const METRIC_RECORDS_DECODED: &str = "store_records_decoded_total";
/// Store retries counter metric name.
pub const METRIC_STORE_RETRIES: &str = "store_retries_total";
/// Store errors counter metric name.
pub const METRIC_STORE_ERRORS: &str = "store_errors_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    describe_counter!(METRIC_HTTP_REQUESTS, "Total HTTP requests by status code");
    describe_counter!(METRIC_SCAN_PAGES, "Total scan pages fetched from the store");
    describe_counter!(
        METRIC_RECORDS_DECODED,
        "Total records decoded from scan pages"
    );
    describe_counter!(
        METRIC_STORE_RETRIES,
        "Total retries after transient store errors"
    );
    describe_counter!(
        METRIC_STORE_ERRORS,
        "Total store calls that failed after retries"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter with its own HTTP listener.
pub fn install_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| AppError::Metrics(format!("failed to install Prometheus exporter: {}", e)))?;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

/// Record a completed HTTP request.
pub fn record_request(status: u16, start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY).record(latency_ms);
    counter!(METRIC_HTTP_REQUESTS, "status" => status.to_string()).increment(1);
}

/// Increment scan pages counter.
pub fn inc_scan_pages() {
    counter!(METRIC_SCAN_PAGES).increment(1);
}

/// Add to records decoded counter.
pub fn add_records_decoded(count: usize) {
    counter!(METRIC_RECORDS_DECODED).increment(count as u64);
}

/// Increment store retries counter.
pub fn inc_store_retries(operation: &'static str) {
    counter!(METRIC_STORE_RETRIES, "operation" => operation).increment(1);
}

/// Increment store errors counter.
pub fn inc_store_errors(operation: &'static str) {
    counter!(METRIC_STORE_ERRORS, "operation" => operation).increment(1);
}
