//! Connection settings for the Data API client.

use std::fmt;

use aws_config::SdkConfig;
use aws_credential_types::provider::ProvideCredentials;
use url::Url;

use crate::error::{DataApiError, DataApiResult};

/// Static AWS credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Data API client configuration.
#[derive(Debug, Clone)]
pub struct DataApiConfig {
    /// Region used for the endpoint and the signing scope.
    pub region: Option<String>,

    /// Endpoint override (otherwise derived from the region).
    pub endpoint: Option<String>,

    pub credentials: Option<Credentials>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for DataApiConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            credentials: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl DataApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let credentials = match (var("AWS_ACCESS_KEY_ID"), var("AWS_SECRET_ACCESS_KEY")) {
            (Some(key), Some(secret)) => Some(Credentials {
                access_key_id: key,
                secret_access_key: secret,
                session_token: var("AWS_SESSION_TOKEN"),
            }),
            _ => None,
        };

        Self {
            region: var("AWS_REGION").or_else(|| var("AWS_DEFAULT_REGION")),
            endpoint: var("LOADPROBE_DATA_API_ENDPOINT"),
            credentials,
            timeout_secs: var("LOADPROBE_HTTP_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Whether region or credentials still have to come from the AWS chain.
    pub(crate) fn needs_shared_config(&self) -> bool {
        self.region.is_none() || self.credentials.is_none()
    }

    /// Fill a missing region and missing credentials from the shared AWS config.
    ///
    /// Values already set (environment or builders) win.
    pub(crate) async fn fill_from(mut self, shared: &SdkConfig) -> DataApiResult<Self> {
        if self.region.is_none() {
            self.region = shared.region().map(|r| r.as_ref().to_string());
        }
        if self.credentials.is_none() {
            let provider = shared
                .credentials_provider()
                .ok_or_else(|| DataApiError::Credentials {
                    message: "no AWS credentials provider available".to_string(),
                })?;
            let resolved =
                provider
                    .provide_credentials()
                    .await
                    .map_err(|e| DataApiError::Credentials {
                        message: format!("failed to resolve AWS credentials: {}", e),
                    })?;
            let mut credentials =
                Credentials::new(resolved.access_key_id(), resolved.secret_access_key());
            if let Some(token) = resolved.session_token() {
                credentials = credentials.with_session_token(token);
            }
            self.credentials = Some(credentials);
        }
        Ok(self)
    }

    pub(crate) fn require_region(&self) -> DataApiResult<&str> {
        self.region.as_deref().ok_or_else(|| DataApiError::Config {
            message: "no region configured (set AWS_REGION or a profile region)".to_string(),
        })
    }

    pub(crate) fn require_credentials(&self) -> DataApiResult<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| DataApiError::Credentials {
                message: "no AWS credentials found in the environment, profile files or instance role"
                    .to_string(),
            })
    }

    /// Endpoint URL: the override when set, else the regional service endpoint.
    pub fn endpoint_url(&self) -> DataApiResult<Url> {
        let raw = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://redshift-data.{}.amazonaws.com/", self.require_region()?),
        };
        let url = Url::parse(&raw).map_err(|e| DataApiError::Config {
            message: format!("invalid endpoint {}: {}", raw, e),
        })?;
        if url.host_str().is_none() {
            return Err(DataApiError::Config {
                message: format!("endpoint {} has no host", raw),
            });
        }
        Ok(url)
    }
}
