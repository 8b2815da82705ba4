//! Integration tests for the stock table API.
//!
//! Most tests drive the public router against the in-memory mock store.
//! The live DynamoDB test requires AWS credentials and a reachable table.
//! Run with: cargo test --test integration -- --ignored

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use aws_sdk_dynamodb::types::AttributeValue;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use topstocks_api::api::{create_router, AppState};
use topstocks_api::config::{Config, ServiceSettings};
use topstocks_api::error::StoreError;
use topstocks_api::query::{FilterExpression, USAGE_MESSAGE};
use topstocks_api::sink::{LogLevel, RecordingSink};
use topstocks_api::store::{DynamoStore, Item, MockTableStore, TableStore};

fn settings(pairs: &[(&str, &str)]) -> ServiceSettings {
    let mut all = vec![
        ("API_NAMESPACE", "x"),
        ("TABLE_NAME", "akc-citybikes"),
        ("STATUS_TABLE", "asigdel-topstocks"),
        ("STORE_RETRY_BASE_DELAY_MS", "1"),
        ("STORE_RETRY_MAX_DELAY_MS", "2"),
    ];
    all.extend_from_slice(pairs);
    Config::from_pairs(all.iter().copied())
        .unwrap()
        .settings()
        .unwrap()
}

fn app(store: &MockTableStore, pairs: &[(&str, &str)]) -> Router {
    create_router(AppState::new(Arc::new(store.clone()), settings(pairs)))
}

fn envelope(symbol: &str, time: &str, price: &str) -> Item {
    let summary = HashMap::from([
        ("Name".to_string(), AttributeValue::S(format!("{symbol} Corp"))),
        ("StockSymbol".to_string(), AttributeValue::S(symbol.to_string())),
        ("Price".to_string(), AttributeValue::N(price.to_string())),
        (
            "DataCollectedOn".to_string(),
            AttributeValue::S("2023-07-04T15:30:00Z".to_string()),
        ),
    ]);
    HashMap::from([
        ("StockSymbol".to_string(), AttributeValue::S(symbol.to_string())),
        ("Time".to_string(), AttributeValue::S(time.to_string())),
        ("Summary".to_string(), AttributeValue::M(summary)),
    ])
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, content_type, body)
}

fn symbols(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["StockSymbol"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn server_reports_system_time() {
    let store = MockTableStore::new();
    let (status, content_type, body) = get(app(&store, &[]), "/x/server").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert!(body["SystemTime"].is_string());
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn status_reports_item_count() {
    let store = MockTableStore::new();
    store.push_item_count(Some(42));

    let (status, content_type, body) = get(app(&store, &[]), "/x/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, json!({ "table": "asigdel-topstocks", "recordCount": 42 }));
    assert_eq!(store.describe_requests(), vec!["asigdel-topstocks".to_string()]);
}

#[tokio::test]
async fn status_reports_null_count() {
    let store = MockTableStore::new();
    store.push_item_count(None);

    let (status, _, body) = get(app(&store, &[]), "/x/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "table": "asigdel-topstocks", "recordCount": null }));
}

#[tokio::test]
async fn status_store_failure_is_500() {
    let store = MockTableStore::new();
    store.push_describe_error(StoreError::Describe {
        table: "asigdel-topstocks".to_string(),
        reason: "AccessDeniedException: not authorized".to_string(),
        transient: false,
    });

    let (status, _, body) = get(app(&store, &[]), "/x/status").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!("internal server error"));
}

#[tokio::test]
async fn all_accumulates_every_page_in_order() {
    let store = MockTableStore::new();
    store
        .push_page(
            vec![
                envelope("AAPL", "2023-07-04 15:30:00", "191.25"),
                envelope("MSFT", "2023-07-04 15:30:00", "337.5"),
            ],
            true,
        )
        .push_page(vec![], true)
        .push_page(vec![envelope("NVDA", "2023-07-05 15:30:00", "423.1")], false);

    let (status, content_type, body) = get(app(&store, &[]), "/x/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(symbols(&body), vec!["AAPL", "MSFT", "NVDA"]);
    assert_eq!(body[0]["Summary"]["Price"], json!(191.25));

    let requests = store.scan_requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.table == "akc-citybikes" && r.filter.is_none()));
}

#[tokio::test]
async fn all_on_empty_table_is_empty_array() {
    let store = MockTableStore::new();
    store.push_page(vec![], false);

    let (status, _, body) = get(app(&store, &[]), "/x/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn all_in_summary_shape_returns_flat_records() {
    let store = MockTableStore::new();
    let flat = HashMap::from([
        ("StockSymbol".to_string(), AttributeValue::S("AAPL".to_string())),
        ("Volume".to_string(), AttributeValue::N("51234000".to_string())),
    ]);
    store.push_page(vec![flat], false);

    let (status, _, body) = get(app(&store, &[("RECORD_SHAPE", "summary")]), "/x/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["StockSymbol"], json!("AAPL"));
    assert_eq!(body[0]["Volume"], json!(51234000));
}

#[tokio::test]
async fn decode_failure_is_500_without_partial_results() {
    let store = MockTableStore::new();
    let broken = HashMap::from([("StockSymbol".to_string(), AttributeValue::S("AAPL".to_string()))]);
    store
        .push_page(vec![envelope("MSFT", "2023-07-04 15:30:00", "337.5")], true)
        .push_page(vec![broken], false);

    let (status, _, body) = get(app(&store, &[]), "/x/all").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!("internal server error"));
}

#[tokio::test]
async fn search_pushes_contains_filter_to_store() {
    let store = MockTableStore::new();
    store
        .push_page(vec![envelope("AAPL", "2023-07-04 15:30:00", "191.25")], true)
        .push_page(vec![envelope("MSFT", "2023-07-04 16:00:00", "337.5")], false);

    let (status, content_type, body) = get(app(&store, &[]), "/x/search?date=2023-07-04").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(symbols(&body), vec!["AAPL", "MSFT"]);

    let expected = Some(FilterExpression::contains("Time", "2023-07-04"));
    let requests = store.scan_requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.filter == expected));
    assert_eq!(requests[1].start_key, Some(MockTableStore::cursor(0)));
}

#[tokio::test]
async fn search_uses_configured_filter_attribute() {
    let store = MockTableStore::new();
    store.push_page(vec![], false);

    let (status, _, body) = get(
        app(&store, &[("FILTER_ATTRIBUTE", "CollectedAt")]),
        "/x/search?date=2023-07-04",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert_eq!(
        store.scan_requests()[0].filter,
        Some(FilterExpression::contains("CollectedAt", "2023-07-04"))
    );
}

#[tokio::test]
async fn malformed_search_is_400_without_store_calls() {
    for uri in [
        "/x/search?date=not-a-date",
        "/x/search?date=2023-13-01",
        "/x/search?date=04-07-2023",
        "/x/search?date=",
        "/x/search",
        "/x/search?date=2023-07-04&date=bad",
        "/x/search?date=a&date=b",
    ] {
        let store = MockTableStore::new();
        let (status, content_type, body) = get(app(&store, &[]), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(content_type.as_deref(), Some("application/json"), "{uri}");
        assert_eq!(body, json!(USAGE_MESSAGE), "{uri}");
        assert_eq!(body, json!("Search should be formatted with search?date=yyyy-mm-dd"));
        assert_eq!(store.call_count(), 0, "{uri}");
    }
}

#[tokio::test]
async fn transient_store_errors_are_retried() {
    let store = MockTableStore::new();
    store
        .push_scan_error(StoreError::Scan {
            table: "akc-citybikes".to_string(),
            reason: "ProvisionedThroughputExceededException".to_string(),
            transient: true,
        })
        .push_page(vec![envelope("AAPL", "2023-07-04 15:30:00", "191.25")], false);

    let (status, _, body) = get(app(&store, &[]), "/x/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(symbols(&body), vec!["AAPL"]);
    assert_eq!(store.scan_requests().len(), 2);
}

#[tokio::test]
async fn exhausted_retries_are_500() {
    let store = MockTableStore::new();
    for _ in 0..3 {
        store.push_scan_error(StoreError::Scan {
            table: "akc-citybikes".to_string(),
            reason: "ThrottlingException".to_string(),
            transient: true,
        });
    }

    let (status, _, _) = get(app(&store, &[("STORE_MAX_RETRIES", "2")]), "/x/all").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.scan_requests().len(), 3);
}

#[tokio::test]
async fn slow_store_hits_request_timeout() {
    let store = MockTableStore::new().with_latency(Duration::from_millis(500));
    store.push_page(vec![], false);

    let (status, _, body) = get(app(&store, &[("REQUEST_TIMEOUT_MS", "20")]), "/x/all").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!("internal server error"));
}

#[tokio::test]
async fn a_failed_request_does_not_affect_the_next() {
    let store = MockTableStore::new();
    store
        .push_describe_error(StoreError::MissingTable {
            table: "asigdel-topstocks".to_string(),
        })
        .push_item_count(Some(7));
    let router = app(&store, &[]);

    let (first, _, _) = get(router.clone(), "/x/status").await;
    let (second, _, body) = get(router, "/x/status").await;

    assert_eq!(first, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["recordCount"], json!(7));
}

#[tokio::test]
async fn request_logger_ships_final_status() {
    let store = MockTableStore::new();
    let sink = RecordingSink::new();
    let state = AppState::new(Arc::new(store.clone()), settings(&[])).with_sink(Arc::new(sink.clone()));
    let router = create_router(state);

    let (status, _, _) = get(router.clone(), "/x/search?date=bad").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = get(router, "/x/server").await;
    assert_eq!(status, StatusCode::OK);

    let mut lines = sink.wait_for(2, Duration::from_secs(2)).await;
    lines.sort_by(|a, b| a.1.cmp(&b.1));
    assert_eq!(
        lines,
        vec![
            (
                LogLevel::Info,
                "Method type: GET | Source IP address: - | Request Path: /x/search?date=bad | Status Code: 400"
                    .to_string()
            ),
            (
                LogLevel::Info,
                "Method type: GET | Source IP address: - | Request Path: /x/server | Status Code: 200"
                    .to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn failing_log_sink_does_not_change_response() {
    let store = MockTableStore::new();
    store.push_item_count(Some(1));
    let sink = RecordingSink::failing();
    let state = AppState::new(Arc::new(store.clone()), settings(&[])).with_sink(Arc::new(sink.clone()));

    let (status, _, body) = get(create_router(state), "/x/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recordCount"], json!(1));
    assert_eq!(sink.wait_for(1, Duration::from_secs(2)).await.len(), 1);
}

/// Describe the configured table against real DynamoDB.
#[tokio::test]
#[ignore = "requires AWS credentials and TABLE_NAME"]
async fn test_live_describe_table() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            println!("Skipping: configuration unavailable: {}", e);
            return;
        }
    };

    let store = DynamoStore::from_config(&config).await;
    let result = store.describe_table(&config.table_name).await;
    assert!(result.is_ok(), "Failed to describe table: {:?}", result.err());

    println!("Item count: {:?}", result.unwrap().item_count);
}
