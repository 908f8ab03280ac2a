//! Provider error types.

use thiserror::Error;

/// Failures talking to the external quote provider.
///
/// A successful call that simply has no data for the requested pair is not an
/// error; see [`FetchOutcome::NoData`](crate::client::FetchOutcome).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level failure reaching the provider.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The provider rejected the request (`success: false`).
    #[error("Provider rejected request (code {code}): {info}")]
    Api { code: i64, info: String },

    /// The response body did not match the expected shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::UnexpectedShape(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
