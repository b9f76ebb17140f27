//! HTTP client for the Redshift Data API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use loadprobe_core::{
    Addressing, AttemptSnapshot, Connector, GatewayResult, QueryBatch, RowSet, RunTarget,
    StatementGateway, StatementId,
};

use crate::config::{Credentials, DataApiConfig};
use crate::error::{DataApiError, DataApiResult};
use crate::sigv4::{sign, SigningRequest};
use crate::types::{
    BatchExecuteStatementRequest, BatchExecuteStatementResponse, DescribeStatementResponse,
    ErrorBody, GetStatementResultResponse, StatementIdRequest,
};

/// User agent for Data API requests.
pub const DATA_API_USER_AGENT: &str = concat!("loadprobe/", env!("CARGO_PKG_VERSION"));

/// Content type of the JSON 1.1 protocol.
pub const AMZ_JSON: &str = "application/x-amz-json-1.1";

const TARGET_PREFIX: &str = "RedshiftData";

/// Signed JSON client for one region.
#[derive(Debug, Clone)]
pub struct DataApiClient {
    client: reqwest::Client,
    endpoint: Url,
    /// `host[:port]` exactly as sent.
    host: String,
    region: String,
    credentials: Credentials,
}

impl DataApiClient {
    /// Create a new client. Fails without a region or credentials.
    pub fn new(config: DataApiConfig) -> DataApiResult<Self> {
        let credentials = config.require_credentials()?.clone();
        let endpoint = config.endpoint_url()?;
        // An explicit endpoint still needs a signing region; fall back to the default one.
        let region = config.region.clone().unwrap_or_else(|| "us-east-1".to_string());

        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(DataApiError::Config {
                    message: format!("endpoint {} has no host", endpoint),
                })
            }
        };

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DATA_API_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| DataApiError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
            host,
            region,
            credentials,
        })
    }

    /// Create a client from environment variables only. [`DataApiConnector`]
    /// also consults profile files and instance roles.
    pub fn from_env() -> DataApiResult<Self> {
        Self::new(DataApiConfig::from_env())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit all statements as one batch.
    pub async fn batch_execute_statement(
        &self,
        sqls: &[String],
        target: &RunTarget,
    ) -> DataApiResult<String> {
        let (cluster_identifier, workgroup_name) = match &target.addressing {
            Addressing::Cluster(id) => (Some(id.as_str()), None),
            Addressing::Workgroup(name) => (None, Some(name.as_str())),
        };
        let request = BatchExecuteStatementRequest {
            sqls,
            database: &target.database,
            secret_arn: &target.secret_arn,
            cluster_identifier,
            workgroup_name,
        };
        let response: BatchExecuteStatementResponse =
            self.call("BatchExecuteStatement", &request).await?;
        Ok(response.id)
    }

    pub(crate) async fn describe_statement(
        &self,
        id: &str,
    ) -> DataApiResult<DescribeStatementResponse> {
        self.call("DescribeStatement", &StatementIdRequest { id }).await
    }

    /// First page of results only.
    pub(crate) async fn get_statement_result(
        &self,
        id: &str,
    ) -> DataApiResult<GetStatementResultResponse> {
        self.call("GetStatementResult", &StatementIdRequest { id }).await
    }

    /// Make a signed call to one operation.
    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> DataApiResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let target = format!("{}.{}", TARGET_PREFIX, operation);
        let body = serde_json::to_vec(request).map_err(|e| DataApiError::InvalidResponse {
            message: format!("failed to encode {} request: {}", operation, e),
        })?;

        let signed = sign(
            &SigningRequest {
                host: &self.host,
                path: self.endpoint.path(),
                content_type: AMZ_JSON,
                target: &target,
                body: &body,
            },
            &self.credentials,
            &self.region,
            chrono::Utc::now(),
        )?;

        debug!(operation, url = %self.endpoint, "data api request");

        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("x-amz-target", &target)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization);
        if let Some(token) = &signed.security_token {
            builder = builder.header("x-amz-security-token", token);
        }

        let response = builder.body(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| DataApiError::Network {
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(DataApiError::Service {
                status: status.as_u16(),
                code: error.code(),
                message: error
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| DataApiError::InvalidResponse {
            message: format!("failed to parse {} response: {}", operation, e),
        })
    }
}

#[async_trait]
impl StatementGateway for DataApiClient {
    async fn submit_batch(
        &self,
        batch: &QueryBatch,
        target: &RunTarget,
    ) -> GatewayResult<StatementId> {
        let id = self
            .batch_execute_statement(batch.statements(), target)
            .await?;
        Ok(StatementId::new(id))
    }

    async fn describe(&self, id: &StatementId) -> GatewayResult<AttemptSnapshot> {
        let response = self.describe_statement(id.as_str()).await?;
        Ok(response.into_snapshot()?)
    }

    async fn fetch_rows(&self, id: &StatementId) -> GatewayResult<RowSet> {
        let response = self.get_statement_result(id.as_str()).await?;
        Ok(response.into_row_set())
    }
}

/// Builds a fresh [`DataApiClient`] for every test.
///
/// A region or credentials missing from the config are resolved through the
/// standard AWS chain: `AWS_PROFILE`, `~/.aws/config` and `~/.aws/credentials`,
/// SSO, web identity, container and instance roles. The chain is loaded once;
/// credentials are asked for on every connect so expiring ones get refreshed.
#[derive(Debug, Clone)]
pub struct DataApiConnector {
    config: DataApiConfig,
    default_chain: bool,
    shared: Arc<OnceCell<SdkConfig>>,
}

impl DataApiConnector {
    pub fn new(config: DataApiConfig) -> Self {
        Self {
            config,
            default_chain: true,
            shared: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(DataApiConfig::from_env())
    }

    /// Use only the region and credentials set on the config.
    pub fn without_default_chain(mut self) -> Self {
        self.default_chain = false;
        self
    }

    pub fn config(&self) -> &DataApiConfig {
        &self.config
    }

    async fn resolve(&self) -> DataApiResult<DataApiConfig> {
        if !self.default_chain || !self.config.needs_shared_config() {
            return Ok(self.config.clone());
        }
        let shared = self
            .shared
            .get_or_init(|| aws_config::defaults(BehaviorVersion::latest()).load())
            .await;
        self.config.clone().fill_from(shared).await
    }
}

#[async_trait]
impl Connector for DataApiConnector {
    async fn connect(&self) -> GatewayResult<Box<dyn StatementGateway>> {
        let config = self.resolve().await?;
        let client = DataApiClient::new(config)?;
        debug!(endpoint = %client.endpoint(), "data api client ready");
        Ok(Box::new(client))
    }
}
