//! Table store access.
//!
//! This module handles:
//! - The `TableStore` seam consumed by the query pipeline
//! - The DynamoDB-backed implementation
//! - Bounded retry for transient store failures
//! - Mock store for testing

pub mod dynamo;
pub mod mock;
pub mod retry;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::error::StoreError;
use crate::query::FilterExpression;

pub use dynamo::DynamoStore;
pub use mock::MockTableStore;
pub use retry::RetryPolicy;

/// One raw item as returned by the store.
pub type Item = HashMap<String, AttributeValue>;

/// Table-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    /// Table name.
    pub table: String,
    /// Approximate item count; `None` when the store reports no count.
    pub item_count: Option<i64>,
}

/// Parameters for fetching one scan page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    /// Table to scan.
    pub table: String,
    /// Server-side filter, if any.
    pub filter: Option<FilterExpression>,
    /// Cursor returned by the previous page.
    pub start_key: Option<Item>,
}

impl ScanRequest {
    /// Unfiltered scan of `table` from the first page.
    pub fn full(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
            start_key: None,
        }
    }

    /// Same request continued from `cursor`.
    pub fn continue_from(&self, cursor: Item) -> Self {
        Self {
            start_key: Some(cursor),
            ..self.clone()
        }
    }
}

/// One batch of items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    /// Items in store order.
    pub items: Vec<Item>,
    /// Cursor for the next page; `None` once the scan is exhausted.
    pub last_evaluated_key: Option<Item>,
}

impl ScanPage {
    /// Whether the store has more pages after this one.
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

/// Paginated read access to a key/attribute table.
#[async_trait]
pub trait TableStore: Send + Sync + std::fmt::Debug {
    /// Fetch table metadata.
    async fn describe_table(&self, table: &str) -> Result<TableDescription, StoreError>;

    /// Fetch one page of a (possibly filtered) scan.
    async fn scan_page(&self, request: &ScanRequest) -> Result<ScanPage, StoreError>;
}
