//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a text-completion backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The call did not finish in time
    #[error("Backend timed out")]
    Timeout,

    /// The backend could not be reached or is overloaded
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request (bad credentials, bad model, ...)
    #[error("Backend rejected request: {0}")]
    Rejected(String),

    /// The backend answered with something that is not a completion
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Whether the same request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Timeout | BackendError::Unavailable(_))
    }
}

/// Trait for text-completion backends
///
/// Implemented by the infrastructure layer (graphsmith-llm). Calls are
/// expected to be deterministic when the backend runs at temperature 0.
#[async_trait]
pub trait TextCompletionBackend: Send + Sync {
    /// Complete `prompt` and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;

    /// Model identifier, used for logging and stats
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T> TextCompletionBackend for std::sync::Arc<T>
where
    T: TextCompletionBackend + ?Sized,
{
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        (**self).complete(prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
