//! Mock table store for unit testing.
//!
//! Replays scripted scan pages and describe responses, records every
//! request it receives, and can inject failures and latency.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use super::{Item, ScanPage, ScanRequest, TableDescription, TableStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct MockState {
    pages: VecDeque<Result<ScanPage, StoreError>>,
    describe: VecDeque<Result<Option<i64>, StoreError>>,
    scan_requests: Vec<ScanRequest>,
    describe_requests: Vec<String>,
}

/// Mock table store for testing.
#[derive(Debug, Clone, Default)]
pub struct MockTableStore {
    state: Arc<Mutex<MockState>>,
    latency: Option<Duration>,
}

impl MockTableStore {
    /// Create an empty mock store. An unscripted scan returns one empty
    /// final page; an unscripted describe reports no item count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a page. When `has_more` is set the page carries a synthetic
    /// cursor naming its position.
    pub fn push_page(&self, items: Vec<Item>, has_more: bool) -> &Self {
        let mut state = self.state();
        let position = state.pages.len();
        let last_evaluated_key = has_more.then(|| Self::cursor(position));
        state.pages.push_back(Ok(ScanPage {
            items,
            last_evaluated_key,
        }));
        drop(state);
        self
    }

    /// Queue a scan failure.
    pub fn push_scan_error(&self, err: StoreError) -> &Self {
        self.state().pages.push_back(Err(err));
        self
    }

    /// Queue a describe response.
    pub fn push_item_count(&self, item_count: Option<i64>) -> &Self {
        self.state().describe.push_back(Ok(item_count));
        self
    }

    /// Queue a describe failure.
    pub fn push_describe_error(&self, err: StoreError) -> &Self {
        self.state().describe.push_back(Err(err));
        self
    }

    /// Cursor the mock attaches to the page scripted at `position`.
    pub fn cursor(position: usize) -> Item {
        HashMap::from([(
            "__page".to_string(),
            AttributeValue::N(position.to_string()),
        )])
    }

    /// Every scan request received, in order.
    pub fn scan_requests(&self) -> Vec<ScanRequest> {
        self.state().scan_requests.clone()
    }

    /// Every table name passed to `describe_table`, in order.
    pub fn describe_requests(&self) -> Vec<String> {
        self.state().describe_requests.clone()
    }

    /// Total store calls of either kind.
    pub fn call_count(&self) -> usize {
        let state = self.state();
        state.scan_requests.len() + state.describe_requests.len()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl TableStore for MockTableStore {
    async fn describe_table(&self, table: &str) -> Result<TableDescription, StoreError> {
        let scripted = {
            let mut state = self.state();
            state.describe_requests.push(table.to_string());
            state.describe.pop_front()
        };
        self.simulate_latency().await;

        let item_count = scripted.unwrap_or(Ok(None))?;
        Ok(TableDescription {
            table: table.to_string(),
            item_count,
        })
    }

    async fn scan_page(&self, request: &ScanRequest) -> Result<ScanPage, StoreError> {
        let scripted = {
            let mut state = self.state();
            state.scan_requests.push(request.clone());
            state.pages.pop_front()
        };
        self.simulate_latency().await;

        scripted.unwrap_or_else(|| Ok(ScanPage::default()))
    }
}
