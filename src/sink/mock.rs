//! Recording log sink for testing.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{LogLevel, LogSink};
use crate::error::SinkError;

/// Sink that keeps every line in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
    fail: bool,
}

impl RecordingSink {
    /// Create a sink that accepts every line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that records every line and then reports a rejection.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<(LogLevel, String)>> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Lines received so far.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.guard().clone()
    }

    /// Poll until at least `count` lines arrived or `timeout` elapsed.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<(LogLevel, String)> {
        let deadline = Instant::now() + timeout;
        loop {
            let lines = self.lines();
            if lines.len() >= count || Instant::now() >= deadline {
                return lines;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl LogSink for RecordingSink {
    async fn send(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        self.guard().push((level, message.to_string()));
        if self.fail {
            return Err(SinkError::Rejected { status: 503 });
        }
        Ok(())
    }
}
