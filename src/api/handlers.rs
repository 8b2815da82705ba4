//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ServiceSettings;
use crate::error::QueryError;
use crate::query::{
    date_search_request, scan_records, table_status, with_deadline, SearchDate, TableStatus,
    USAGE_MESSAGE,
};
use crate::records::Records;
use crate::sink::LogSink;
use crate::store::{ScanRequest, TableStore};

/// Body returned for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Table store client.
    pub store: Arc<dyn TableStore>,
    /// Resolved service settings.
    pub settings: Arc<ServiceSettings>,
    /// Remote log sink, if configured.
    pub sink: Option<Arc<dyn LogSink>>,
}

impl AppState {
    /// Create new app state without a log sink.
    pub fn new(store: Arc<dyn TableStore>, settings: ServiceSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
            sink: None,
        }
    }

    /// Attach a remote log sink.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }
}

/// Handler failures, mapped to HTTP responses at the boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The search token is missing or malformed.
    #[error("invalid search token")]
    InvalidSearch,

    /// Store, decode or deadline failure.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidSearch => (StatusCode::BAD_REQUEST, Json(USAGE_MESSAGE)).into_response(),
            ApiError::Query(err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(INTERNAL_ERROR_MESSAGE),
                )
                    .into_response()
            }
        }
    }
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct ServerTimeResponse {
    /// Server wall clock.
    #[serde(rename = "SystemTime")]
    pub system_time: String,
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Date token, `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Liveness handler - always returns 200 with the server clock.
pub async fn server_time() -> impl IntoResponse {
    Json(ServerTimeResponse {
        system_time: chrono::Local::now().to_string(),
    })
}

/// Status handler - reports the item count of the status table.
pub async fn status(State(state): State<AppState>) -> Result<Json<TableStatus>, ApiError> {
    let settings = &state.settings;
    let status = with_deadline(
        settings.request_timeout,
        table_status(state.store.as_ref(), &settings.status_table, &settings.retry),
    )
    .await?;

    Ok(Json(status))
}

/// All handler - returns every record in the table.
pub async fn all(State(state): State<AppState>) -> Result<Json<Records>, ApiError> {
    let settings = &state.settings;
    let records = with_deadline(
        settings.request_timeout,
        scan_records(
            state.store.as_ref(),
            ScanRequest::full(settings.table_name.as_str()),
            settings.record_shape,
            &settings.retry,
        ),
    )
    .await?;

    debug!(records = records.len(), "Returning records");
    Ok(Json(records))
}

/// Search handler - returns records whose filter attribute contains the date.
///
/// The date is validated before any store access. A query string that does
/// not deserialize (e.g. a repeated `date`) is treated as a malformed date.
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Records>, ApiError> {
    let Query(params) = query.map_err(|rejection| {
        debug!(error = %rejection, "Rejected search query string");
        ApiError::InvalidSearch
    })?;
    let date = params
        .date
        .as_deref()
        .and_then(SearchDate::parse)
        .ok_or(ApiError::InvalidSearch)?;

    let settings = &state.settings;
    debug!(date = %date, attribute = %settings.filter_attribute, "Searching by date");

    let request = date_search_request(
        settings.table_name.as_str(),
        settings.filter_attribute.as_str(),
        &date,
    );
    let records = with_deadline(
        settings.request_timeout,
        scan_records(
            state.store.as_ref(),
            request,
            settings.record_shape,
            &settings.retry,
        ),
    )
    .await?;

    debug!(records = records.len(), "Returning records");
    Ok(Json(records))
}

/// Fallback for unrouted paths.
pub async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
