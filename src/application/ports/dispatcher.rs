//! Answer dispatch port interface

use async_trait::async_trait;
use thiserror::Error;

/// Dispatch errors
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Not signed in. Provide a session token and try again.")]
    MissingCredential,

    #[error("Session token rejected")]
    Unauthorized,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Empty answer response")]
    EmptyAnswer,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// Port for the backend answer call.
///
/// Single-shot: the caller invokes it at most once per session and performs
/// no retries. The transcript is expected to be non-empty and trimmed.
#[async_trait]
pub trait AnswerDispatcher: Send + Sync {
    /// Submit the utterance and return the answer text.
    ///
    /// # Arguments
    /// * `transcript` - The finalized utterance
    /// * `token` - Opaque bearer credential authorizing the call
    async fn dispatch(&self, transcript: &str, token: &str) -> Result<String, DispatchError>;
}
