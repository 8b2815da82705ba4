//! Remote log shipping.
//!
//! This module handles:
//! - The `LogSink` seam used by the request logger
//! - The Loggly HTTP client
//! - A recording sink for tests

pub mod loggly;
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use strum::Display;
use tracing::warn;

use crate::error::SinkError;

pub use loggly::LogglyClient;
pub use mock::RecordingSink;

/// Severity attached to a shipped line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Destination for request log lines.
#[async_trait]
pub trait LogSink: Send + Sync + std::fmt::Debug {
    /// Deliver one line.
    async fn send(&self, level: LogLevel, message: &str) -> Result<(), SinkError>;
}

/// Ship `message` on a detached task. Delivery failures are logged and
/// otherwise ignored.
pub fn ship(sink: Arc<dyn LogSink>, level: LogLevel, message: String) {
    tokio::spawn(async move {
        if let Err(e) = sink.send(level, &message).await {
            warn!(error = %e, "Failed to ship log line");
        }
    });
}
