//! Seam to the remote statement service.

use async_trait::async_trait;

use crate::model::{AttemptSnapshot, QueryBatch, RowSet, StatementId};

/// Where a batch runs. Exactly one addressing mode per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// Provisioned cluster identifier.
    Cluster(String),
    /// Serverless workgroup name.
    Workgroup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTarget {
    pub database: String,
    pub secret_arn: String,
    pub addressing: Addressing,
}

/// Errors reported by a gateway call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The service rejected the request.
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("credentials error: {message}")]
    Credentials { message: String },

    /// Endpoint or region settings are unusable.
    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote statement service operations used by the engine.
///
/// Every call may fail; callers treat failures as per-attempt outcomes.
#[async_trait]
pub trait StatementGateway: Send + Sync {
    async fn submit_batch(
        &self,
        batch: &QueryBatch,
        target: &RunTarget,
    ) -> GatewayResult<StatementId>;

    /// Current state of a submitted batch. Durations are in seconds.
    async fn describe(&self, id: &StatementId) -> GatewayResult<AttemptSnapshot>;

    async fn fetch_rows(&self, id: &StatementId) -> GatewayResult<RowSet>;

    /// Release the underlying connection.
    async fn close(&self) {}
}

/// Opens a gateway scoped to one test.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> GatewayResult<Box<dyn StatementGateway>>;
}
