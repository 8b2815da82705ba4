//! Unified error types for the API service.

use thiserror::Error;

/// Startup and wiring failures.
#[derive(Error, Debug)]
pub enum AppError {
    /// Environment could not be deserialized into a configuration.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Log sink could not be built.
    #[error("log sink error: {0}")]
    Sink(#[from] SinkError),

    /// Metrics exporter could not be installed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// Listener or server IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the table store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Table metadata could not be fetched.
    #[error("describe table {table} failed: {reason}")]
    Describe {
        /// Table name.
        table: String,
        /// Reason for failure.
        reason: String,
        /// Whether a retry may succeed.
        transient: bool,
    },

    /// A scan page could not be fetched.
    #[error("scan of {table} failed: {reason}")]
    Scan {
        /// Table name.
        table: String,
        /// Reason for failure.
        reason: String,
        /// Whether a retry may succeed.
        transient: bool,
    },

    /// The describe response carried no table description.
    #[error("describe table {table} returned no table description")]
    MissingTable {
        /// Table name.
        table: String,
    },
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Describe { transient, .. } | StoreError::Scan { transient, .. } => {
                *transient
            }
            StoreError::MissingTable { .. } => false,
        }
    }
}

/// A raw store item did not match the expected record shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Attribute type has no JSON equivalent.
    #[error("item {index}: attribute {attribute} is not decodable: {reason}")]
    Attribute {
        /// Position of the item within its page.
        index: usize,
        /// Attribute name.
        attribute: String,
        /// Reason for failure.
        reason: String,
    },

    /// Item decoded to JSON but not to the record shape.
    #[error("item {index} does not match the record shape: {reason}")]
    Shape {
        /// Position of the item within its page.
        index: usize,
        /// Reason for failure.
        reason: String,
    },
}

/// Failures of the query pipeline for a single request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Store call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A page could not be decoded.
    #[error("decode error on page {page}: {source}")]
    Decode {
        /// Zero-based page number.
        page: usize,
        /// Underlying decode failure.
        #[source]
        source: DecodeError,
    },

    /// The request deadline elapsed before the store work finished.
    #[error("store work exceeded {timeout_ms}ms")]
    Timeout {
        /// Configured deadline.
        timeout_ms: u64,
    },
}

/// Log sink delivery errors.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Request could not be sent.
    #[error("log sink request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Sink answered with a non-success status.
    #[error("log sink rejected message: HTTP {status}")]
    Rejected {
        /// HTTP status returned by the sink.
        status: u16,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
