//! Redshift Data API statement gateway.
//!
//! Talks to the Data API over its JSON 1.1 protocol with SigV4-signed requests:
//!
//! - `BatchExecuteStatement` to submit an attempt
//! - `DescribeStatement` to poll it
//! - `GetStatementResult` to sample rows (first page only)
//!
//! # Quick Start
//!
//! ```no_run
//! use loadprobe_core::{Addressing, QueryBatch, RunTarget, StatementGateway};
//! use loadprobe_dataapi::DataApiClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DataApiClient::from_env()?;
//! let target = RunTarget {
//!     database: "dev".into(),
//!     secret_arn: "arn:aws:secretsmanager:eu-west-1:123456789012:secret:dev".into(),
//!     addressing: Addressing::Workgroup("analytics-wg".into()),
//! };
//! let id = client
//!     .submit_batch(&QueryBatch::new(vec!["select 1".into()]), &target)
//!     .await?;
//! println!("submitted {}", id);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `AWS_REGION` / `AWS_DEFAULT_REGION` | Region for the endpoint and signing scope |
//! | `AWS_ACCESS_KEY_ID` | Access key |
//! | `AWS_SECRET_ACCESS_KEY` | Secret key |
//! | `AWS_SESSION_TOKEN` | Session token for temporary credentials |
//! | `LOADPROBE_DATA_API_ENDPOINT` | Endpoint override |
//! | `LOADPROBE_HTTP_TIMEOUT` | Request timeout in seconds (default: 30) |
//!
//! [`DataApiConnector`] falls back to the standard AWS chain (`AWS_PROFILE`,
//! `~/.aws` files, SSO, container and instance roles) for whatever the
//! variables above leave unset.

pub mod client;
pub mod config;
pub mod error;
mod sigv4;
mod types;

pub use client::{DataApiClient, DataApiConnector, AMZ_JSON, DATA_API_USER_AGENT};
pub use config::{Credentials, DataApiConfig};
pub use error::{DataApiError, DataApiResult};
