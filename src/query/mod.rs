//! Query pipeline over the table store.
//!
//! This module handles:
//! - Date search token validation
//! - Server-side filter construction
//! - Paginated scan accumulation and decoding
//! - Table status reporting

pub mod date;
pub mod filter;
pub mod scan;
pub mod status;

use std::future::Future;
use std::time::Duration;

use crate::error::QueryError;

pub use date::{is_valid_date, SearchDate, USAGE_MESSAGE};
pub use filter::{date_search_request, FilterExpression};
pub use scan::{scan_all, scan_records};
pub use status::{table_status, TableStatus};

/// Bound `work` by `timeout`, mapping expiry to `QueryError::Timeout`.
pub async fn with_deadline<T, F>(timeout: Duration, work: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, QueryError>>,
{
    tokio::time::timeout(timeout, work)
        .await
        .map_err(|_| QueryError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        })?
}
