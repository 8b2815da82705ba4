//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;

use crate::api::EndpointSet;
use crate::error::{AppError, Result};
use crate::records::RecordShape;
use crate::store::RetryPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Store Credentials ===
    /// AWS region of the table.
    #[serde(default = "default_region")]
    pub aws_region: String,

    /// Static access key. The SDK default credential chain is used when unset.
    #[serde(default)]
    pub aws_access_key_id: Option<String>,

    /// Static secret key, paired with `aws_access_key_id`.
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,

    /// Endpoint override (e.g. DynamoDB Local).
    #[serde(default)]
    pub dynamodb_endpoint: Option<String>,

    // === Table ===
    /// Table scanned by the `all` and `search` endpoints.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Table described by the `status` endpoint.
    #[serde(default = "default_status_table")]
    pub status_table: String,

    /// Item shape stored in the table: `summary` or `envelope`.
    #[serde(default = "default_record_shape")]
    pub record_shape: String,

    /// Attribute the date search is matched against.
    #[serde(default = "default_filter_attribute")]
    pub filter_attribute: String,

    // === HTTP Surface ===
    /// Leading path segment for every route.
    #[serde(default = "default_namespace")]
    pub api_namespace: String,

    /// Enabled endpoints (comma separated).
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on the store work done for a single request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    // === Store Retry ===
    /// Retries after the first attempt for transient store errors.
    #[serde(default = "default_max_retries")]
    pub store_max_retries: u32,

    /// Initial backoff delay in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub store_retry_base_delay_ms: u64,

    /// Maximum backoff delay in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    pub store_retry_max_delay_ms: u64,

    // === Log Shipping ===
    /// Loggly customer token. Log shipping is disabled when unset.
    #[serde(default)]
    pub loggly_token: Option<String>,

    /// Loggly tag attached to every shipped line.
    #[serde(default = "default_loggly_tag")]
    pub loggly_tag: String,

    /// Loggly ingestion base URL.
    #[serde(default = "default_loggly_url")]
    pub loggly_url: String,

    // === Observability ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Enable the Prometheus exporter.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

/// Resolved, typed view of the settings handlers depend on.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Leading path segment.
    pub namespace: String,
    /// Table scanned by `all` and `search`.
    pub table_name: String,
    /// Table described by `status`.
    pub status_table: String,
    /// Decode target for scanned items.
    pub record_shape: RecordShape,
    /// Attribute matched by the date search.
    pub filter_attribute: String,
    /// Routed endpoints.
    pub endpoints: EndpointSet,
    /// Per-request store deadline.
    pub request_timeout: Duration,
    /// Retry policy for store calls.
    pub retry: RetryPolicy,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_table_name() -> String {
    "akc-citybikes".to_string()
}

fn default_record_shape() -> String {
    "envelope".to_string()
}

fn default_filter_attribute() -> String {
    "Time".to_string()
}

fn default_namespace() -> String {
    "asigdel".to_string()
}

fn default_endpoints() -> Vec<String> {
    ["server", "status", "all", "search"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2_000
}

fn default_loggly_tag() -> String {
    "server".to_string()
}

fn default_loggly_url() -> String {
    "https://logs-01.loggly.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_status_table() -> String {
    "asigdel-topstocks".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9090
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Build configuration from explicit key/value pairs instead of the
    /// process environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(envy::from_iter(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())),
        )?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(invalid("TABLE_NAME must not be empty"));
        }

        if self.status_table.trim().is_empty() {
            return Err(invalid("STATUS_TABLE must not be empty"));
        }

        if self.filter_attribute.trim().is_empty() {
            return Err(invalid("FILTER_ATTRIBUTE must not be empty"));
        }

        if self.api_namespace.is_empty() || self.api_namespace.contains('/') {
            return Err(invalid("API_NAMESPACE must be a single non-empty path segment"));
        }

        if self.aws_access_key_id.is_some() != self.aws_secret_access_key.is_some() {
            return Err(invalid("AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"));
        }

        if self.request_timeout_ms == 0 {
            return Err(invalid("REQUEST_TIMEOUT_MS must be greater than 0"));
        }

        if self.store_retry_base_delay_ms > self.store_retry_max_delay_ms {
            return Err(invalid("STORE_RETRY_BASE_DELAY_MS must not exceed STORE_RETRY_MAX_DELAY_MS"));
        }

        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            return Err(invalid("LOG_FORMAT must be `pretty` or `json`"));
        }

        self.settings().map(|_| ())
    }

    /// Resolve the typed settings shared with request handlers.
    pub fn settings(&self) -> Result<ServiceSettings> {
        let record_shape = self.record_shape.parse::<RecordShape>().map_err(|_| {
            AppError::InvalidConfig(format!("unknown RECORD_SHAPE `{}`", self.record_shape))
        })?;

        let endpoints =
            EndpointSet::parse(self.endpoints.as_slice()).map_err(AppError::InvalidConfig)?;

        Ok(ServiceSettings {
            namespace: self.api_namespace.clone(),
            table_name: self.table_name.clone(),
            status_table: self.status_table.clone(),
            record_shape,
            filter_attribute: self.filter_attribute.clone(),
            endpoints,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            retry: RetryPolicy {
                max_retries: self.store_max_retries,
                base_delay: Duration::from_millis(self.store_retry_base_delay_ms),
                max_delay: Duration::from_millis(self.store_retry_max_delay_ms),
            },
        })
    }

    /// Whether a Loggly sink should be built.
    pub fn log_shipping_enabled(&self) -> bool {
        self.loggly_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::InvalidConfig(message.to_string())
}
