//! Error types for the Data API client.

use loadprobe_core::GatewayError;

/// Data API errors.
#[derive(Debug, thiserror::Error)]
pub enum DataApiError {
    /// The service answered with an exception body.
    #[error("{code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Body could not be decoded, or carried an unknown status.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Missing or unusable credentials.
    #[error("credentials error: {message}")]
    Credentials { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl From<reqwest::Error> for DataApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

impl From<DataApiError> for GatewayError {
    fn from(err: DataApiError) -> Self {
        match err {
            DataApiError::Service { code, message, .. } => GatewayError::Service { code, message },
            DataApiError::Network { message } => GatewayError::Network { message },
            DataApiError::InvalidResponse { message } => GatewayError::InvalidResponse { message },
            DataApiError::Credentials { message } => GatewayError::Credentials { message },
            DataApiError::Config { message } => GatewayError::Config { message },
        }
    }
}

/// Result type for Data API operations.
pub type DataApiResult<T> = Result<T, DataApiError>;
