//! DynamoDB-backed table store.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info, instrument};

use super::{ScanPage, ScanRequest, TableDescription, TableStore};
use crate::config::Config;
use crate::error::StoreError;

/// Service error codes worth retrying.
const TRANSIENT_ERROR_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "RequestLimitExceeded",
    "InternalServerError",
    "ServiceUnavailable",
];

/// Table store backed by the DynamoDB SDK client.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    /// Wrap an existing SDK client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from explicit configuration.
    ///
    /// Static credentials are used when both keys are set; otherwise the SDK
    /// default provider chain applies. SDK-level retries are disabled so the
    /// service's own `RetryPolicy` is the only retry layer.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .retry_config(RetryConfig::disabled());

        if let (Some(key_id), Some(secret)) =
            (&config.aws_access_key_id, &config.aws_secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "topstocks-config",
            ));
        }

        if let Some(endpoint) = &config.dynamodb_endpoint {
            info!(endpoint = %endpoint, "Using DynamoDB endpoint override");
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }

    /// Get the SDK client reference.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl TableStore for DynamoStore {
    #[instrument(skip(self))]
    async fn describe_table(&self, table: &str) -> Result<TableDescription, StoreError> {
        let output = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| {
                let (reason, transient) = classify(&e);
                StoreError::Describe {
                    table: table.to_string(),
                    reason,
                    transient,
                }
            })?;

        let description = output.table.ok_or_else(|| StoreError::MissingTable {
            table: table.to_string(),
        })?;

        debug!(item_count = ?description.item_count, "Described table");

        Ok(TableDescription {
            table: table.to_string(),
            item_count: description.item_count,
        })
    }

    #[instrument(skip(self, request), fields(table = %request.table, filtered = request.filter.is_some()))]
    async fn scan_page(&self, request: &ScanRequest) -> Result<ScanPage, StoreError> {
        let mut scan = self
            .client
            .scan()
            .table_name(&request.table)
            .set_exclusive_start_key(request.start_key.clone());

        if let Some(filter) = &request.filter {
            scan = scan
                .filter_expression(filter.expression())
                .set_expression_attribute_names(Some(filter.attribute_names()))
                .set_expression_attribute_values(Some(filter.attribute_values()));
        }

        let output = scan.send().await.map_err(|e| {
            let (reason, transient) = classify(&e);
            StoreError::Scan {
                table: request.table.clone(),
                reason,
                transient,
            }
        })?;

        let items = output.items.unwrap_or_default();
        let last_evaluated_key = output.last_evaluated_key.filter(|key| !key.is_empty());

        debug!(
            items = items.len(),
            has_more = last_evaluated_key.is_some(),
            "Fetched scan page"
        );

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }
}

/// Render an SDK error and decide whether it is worth retrying.
fn classify<E, R>(err: &SdkError<E, R>) -> (String, bool)
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let transient = match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            true
        }
        SdkError::ServiceError(_) => err
            .code()
            .is_some_and(|code| TRANSIENT_ERROR_CODES.contains(&code)),
        _ => false,
    };

    (DisplayErrorContext(err).to_string(), transient)
}
