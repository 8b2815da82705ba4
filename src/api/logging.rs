//! Request logging middleware.
//!
//! Runs around every route, reads the final status code once the inner
//! handler has produced its response, and ships one line per request to the
//! configured log sink.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::info;

use super::handlers::AppState;
use crate::metrics;
use crate::sink::{self, LogLevel};

/// Placeholder when the peer address is unknown.
const UNKNOWN_SOURCE: &str = "-";

/// Format the shipped request line.
pub fn request_line(method: &Method, source: &str, uri: &str, status: StatusCode) -> String {
    format!(
        "Method type: {} | Source IP address: {} | Request Path: {} | Status Code: {}",
        method,
        source,
        uri,
        status.as_u16()
    )
}

/// Log method, caller, URI and final status of every request.
pub async fn log_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().to_string();
    let source = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics::record_request(status.as_u16(), start);

    info!(
        method = %method,
        source = %source,
        uri = %uri,
        status = status.as_u16(),
        latency_ms,
        "Request completed"
    );

    if let Some(log_sink) = &state.sink {
        sink::ship(
            log_sink.clone(),
            LogLevel::Info,
            request_line(&method, &source, &uri, status),
        );
    }

    response
}
