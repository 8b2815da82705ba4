//! Loggly HTTP input client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{LogLevel, LogSink};
use crate::config::Config;
use crate::error::SinkError;

/// Body posted to the Loggly input endpoint.
#[derive(Debug, Serialize)]
struct LogglyEvent<'a> {
    level: LogLevel,
    message: &'a str,
}

/// Ships log lines to a Loggly tagged HTTP input.
#[derive(Debug, Clone)]
pub struct LogglyClient {
    /// HTTP client for input requests.
    http: reqwest::Client,
    /// Fully built input URL including token and tag.
    endpoint: String,
}

impl LogglyClient {
    /// Create a client for `token`, tagging every line with `tag`.
    pub fn new(base_url: &str, token: &str, tag: &str) -> Result<Self, SinkError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .connect_timeout(std::time::Duration::from_secs(2))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            endpoint: Self::input_url(base_url, token, tag),
        })
    }

    /// Build a client from configuration; `None` when no token is set.
    pub fn from_config(config: &Config) -> Result<Option<Self>, SinkError> {
        match config.loggly_token.as_deref() {
            Some(token) if !token.is_empty() => {
                Self::new(&config.loggly_url, token, &config.loggly_tag).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Tagged input URL for `token`.
    pub fn input_url(base_url: &str, token: &str, tag: &str) -> String {
        format!(
            "{}/inputs/{}/tag/{}/",
            base_url.trim_end_matches('/'),
            token,
            tag
        )
    }

    /// Get the input URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LogSink for LogglyClient {
    async fn send(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&LogglyEvent { level, message })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected {
                status: response.status().as_u16(),
            });
        }

        debug!("Shipped log line to Loggly");
        Ok(())
    }
}
