//! Read-only HTTP API over a DynamoDB stock summary table.
//!
//! The service reports table status, dumps every record, and searches
//! records by the date embedded in their time attribute:
//!
//! ```text
//! GET /{ns}/server               -> {"SystemTime": "..."}
//! GET /{ns}/status               -> {"table": "...", "recordCount": 42}
//! GET /{ns}/all                  -> [record, ...]
//! GET /{ns}/search?date=YYYY-MM-DD -> [record, ...]
//! ```
//!
//! Scans are drained page by page and decoded into typed records; the date
//! search is pushed to the store as a `contains` filter.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`records`]: Record shapes and item decoding
//! - [`store`]: Table store seam, DynamoDB client and retry policy
//! - [`query`]: Date validation, filters, scan accumulation, status
//! - [`api`]: HTTP handlers, routes and request logging
//! - [`sink`]: Remote log shipping
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod query;
pub mod records;
pub mod sink;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
