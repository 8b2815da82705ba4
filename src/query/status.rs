//! Table status reporting.

use serde::Serialize;
use tracing::instrument;

use crate::error::QueryError;
use crate::store::{RetryPolicy, TableStore};

/// Status payload for the configured table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    /// Table name.
    pub table: String,
    /// Item count as reported by the store; serialized as `null` when absent.
    #[serde(rename = "recordCount")]
    pub record_count: Option<i64>,
}

/// Describe `table` and shape the result into a `TableStatus`.
#[instrument(skip(store, retry))]
pub async fn table_status(
    store: &dyn TableStore,
    table: &str,
    retry: &RetryPolicy,
) -> Result<TableStatus, QueryError> {
    let description = retry
        .run("describe_table", || store.describe_table(table))
        .await?;

    Ok(TableStatus {
        table: table.to_string(),
        record_count: description.item_count,
    })
}
