//! Paginated scan accumulation.

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::error::QueryError;
use crate::metrics;
use crate::records::{decode_items, Envelope, RecordShape, Records, Summary};
use crate::store::{RetryPolicy, ScanPage, ScanRequest, TableStore};

/// Drain a scan page by page into one ordered result set.
///
/// Pages are appended in the order the store returns them. A decode failure
/// on any page aborts the whole scan; records from earlier pages are
/// discarded.
#[instrument(skip(store, request, retry), fields(table = %request.table, filtered = request.filter.is_some()))]
pub async fn scan_all<R>(
    store: &dyn TableStore,
    request: ScanRequest,
    retry: &RetryPolicy,
) -> Result<Vec<R>, QueryError>
where
    R: DeserializeOwned + Send,
{
    let mut records = Vec::new();
    let mut request = request;
    let mut page = 0;

    loop {
        let ScanPage {
            items,
            last_evaluated_key,
        } = retry.run("scan", || store.scan_page(&request)).await?;
        metrics::inc_scan_pages();

        let decoded: Vec<R> =
            decode_items(items).map_err(|source| QueryError::Decode { page, source })?;
        debug!(page, records = decoded.len(), "Decoded scan page");
        records.extend(decoded);

        match last_evaluated_key {
            Some(cursor) => {
                request = request.continue_from(cursor);
                page += 1;
            }
            None => break,
        }
    }

    metrics::add_records_decoded(records.len());
    info!(pages = page + 1, records = records.len(), "Scan complete");
    Ok(records)
}

/// Scan and decode into the configured record shape.
pub async fn scan_records(
    store: &dyn TableStore,
    request: ScanRequest,
    shape: RecordShape,
    retry: &RetryPolicy,
) -> Result<Records, QueryError> {
    match shape {
        RecordShape::Summary => scan_all::<Summary>(store, request, retry)
            .await
            .map(Records::Summary),
        RecordShape::Envelope => scan_all::<Envelope>(store, request, retry)
            .await
            .map(Records::Envelope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, StoreError};
    use crate::store::{Item, MockTableStore};
    use aws_sdk_dynamodb::types::AttributeValue;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::time::Duration;

    fn summary(symbol: &str) -> Item {
        HashMap::from([
            ("StockSymbol".to_string(), AttributeValue::S(symbol.to_string())),
            ("Price".to_string(), AttributeValue::N("10.5".to_string())),
        ])
    }

    fn symbols(records: &[Summary]) -> Vec<&str> {
        records
            .iter()
            .map(|r| r.stock_symbol.as_deref().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn accumulates_pages_in_store_order() {
        let store = MockTableStore::new();
        store
            .push_page(vec![summary("AAPL"), summary("MSFT")], true)
            .push_page(vec![], true)
            .push_page(vec![summary("NVDA")], false);

        let records: Vec<Summary> =
            scan_all(&store, ScanRequest::full("stocks"), &RetryPolicy::none())
                .await
                .unwrap();

        assert_eq!(symbols(&records), vec!["AAPL", "MSFT", "NVDA"]);
        assert_eq!(store.scan_requests().len(), 3);
    }

    #[tokio::test]
    async fn follows_store_cursor() {
        let store = MockTableStore::new();
        store
            .push_page(vec![summary("AAPL")], true)
            .push_page(vec![summary("MSFT")], false);

        let _: Vec<Summary> = scan_all(&store, ScanRequest::full("stocks"), &RetryPolicy::none())
            .await
            .unwrap();

        let requests = store.scan_requests();
        assert_eq!(requests[0].start_key, None);
        assert_eq!(requests[1].start_key, Some(MockTableStore::cursor(0)));
    }

    #[tokio::test]
    async fn empty_table_yields_empty_result() {
        let store = MockTableStore::new();
        store.push_page(vec![], false);

        let records: Vec<Summary> =
            scan_all(&store, ScanRequest::full("stocks"), &RetryPolicy::none())
                .await
                .unwrap();

        assert!(records.is_empty());
        assert_eq!(store.scan_requests().len(), 1);
    }

    #[tokio::test]
    async fn decode_failure_aborts_scan() {
        let bad = HashMap::from([(
            "Price".to_string(),
            AttributeValue::S("ten".to_string()),
        )]);
        let store = MockTableStore::new();
        store
            .push_page(vec![summary("AAPL")], true)
            .push_page(vec![bad], true)
            .push_page(vec![summary("NVDA")], false);

        let err = scan_all::<Summary>(&store, ScanRequest::full("stocks"), &RetryPolicy::none())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            QueryError::Decode {
                page: 1,
                source: DecodeError::Shape { index: 0, .. }
            }
        ));
        assert_eq!(store.scan_requests().len(), 2);
    }

    #[tokio::test]
    async fn transient_scan_errors_are_retried() {
        let store = MockTableStore::new();
        store
            .push_scan_error(StoreError::Scan {
                table: "stocks".to_string(),
                reason: "ThrottlingException".to_string(),
                transient: true,
            })
            .push_page(vec![summary("AAPL")], false);

        let retry = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        };
        let records: Vec<Summary> = scan_all(&store, ScanRequest::full("stocks"), &retry)
            .await
            .unwrap();

        assert_eq!(symbols(&records), vec!["AAPL"]);
        assert_eq!(store.scan_requests().len(), 2);
    }

    #[tokio::test]
    async fn permanent_scan_error_surfaces() {
        let store = MockTableStore::new();
        store.push_scan_error(StoreError::Scan {
            table: "stocks".to_string(),
            reason: "ResourceNotFoundException".to_string(),
            transient: false,
        });

        let err = scan_all::<Summary>(&store, ScanRequest::full("stocks"), &RetryPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::Store(StoreError::Scan { .. })));
        assert_eq!(store.scan_requests().len(), 1);
    }

    #[tokio::test]
    async fn scan_records_dispatches_on_shape() {
        let store = MockTableStore::new();
        store.push_page(vec![summary("AAPL")], false);

        let records = scan_records(
            &store,
            ScanRequest::full("stocks"),
            RecordShape::Summary,
            &RetryPolicy::none(),
        )
        .await
        .unwrap();

        assert!(matches!(records, Records::Summary(ref r) if r.len() == 1));
    }
}
