//! Fetch-layer error types
//!
//! Error definitions with transient/permanent classification for retry logic.

use thiserror::Error;

/// Error that can occur while fetching inventory from an upstream service.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network/HTTP-layer failure (connect errors, timeouts, 429/5xx after
    /// the transport retry budget is spent).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response body was not in the expected shape (missing field,
    /// malformed payload).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Upstream rejected the request with a non-retryable HTTP status
    /// (bad credentials, missing endpoint, and similar).
    #[error("{context}: upstream returned HTTP {status}")]
    Http { status: u16, context: String },

    /// Client or fetch configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Transport retry budget exhausted.
    #[error("maximum retries exceeded after {attempts} attempt(s): {message}")]
    MaxRetriesExceeded { attempts: u32, message: String },

    /// The comparison run was cancelled before this phase started.
    #[error("comparison cancelled")]
    Cancelled,

    /// A page-fetch task panicked or was aborted.
    #[error("fetch task failed: {message}")]
    TaskFailed { message: String },
}

impl FetchError {
    /// Check if this error is transient and the operation should be retried.
    ///
    /// Transient errors are those caused by temporary conditions that may
    /// resolve themselves, such as network issues or upstream throttling.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    // Convenience constructors

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error with source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FetchError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        FetchError::Parse {
            message: message.into(),
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        FetchError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status.
    ///
    /// Throttling (429) and server errors are transient transport failures
    /// eligible for retry; every other status is permanent.
    pub fn from_status(status: reqwest::StatusCode, context: impl Into<String>) -> Self {
        let context = context.into();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            FetchError::Transport {
                message: format!("{context}: upstream returned HTTP {status}"),
                source: None,
            }
        } else {
            FetchError::Http {
                status: status.as_u16(),
                context,
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse {
                message: err.to_string(),
            }
        } else {
            FetchError::Transport {
                message: err.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
