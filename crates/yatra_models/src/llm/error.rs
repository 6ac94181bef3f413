//! Failures talking to a model provider.

use core::time::Duration;

/// Why a completion failed.
///
/// Providers report these as-is and never retry; the caller decides what a
/// failed completion means for the conversation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The request never got a response (connect, TLS, read timeout).
    #[error("http error: {0}")]
    Http(String),

    /// A body could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Too many requests.
    #[error("rate limited{}", .retry_after.map(|d| format!(", retry after {d:?}")).unwrap_or_default())]
    RateLimited {
        /// Wait suggested by the provider, when it sent one.
        retry_after: Option<Duration>,
    },

    /// The request could not be expressed in the provider's format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response was unreadable or held nothing usable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The model declined to answer.
    #[error("model refused: {0}")]
    Refusal(String),

    /// Any other non-success answer.
    #[error("provider error: {message}")]
    Provider {
        /// Response status, if there was a response.
        status: Option<u16>,
        /// Body or description.
        message: String,
        /// Lower-level cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}
