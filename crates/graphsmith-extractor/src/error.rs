//! Error types for the Extractor

use graphsmith_domain::{BackendError, SchemaError};
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Schemas could not be registered
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Backend output could not be parsed into nodes and relationships
    #[error("Extraction parse error: {0}")]
    ExtractionParse(String),

    /// Every attempt timed out
    #[error("Backend timed out after {attempts} attempt(s)")]
    BackendTimeout {
        /// Attempts made before giving up
        attempts: usize,
    },

    /// Backend stayed unreachable or overloaded
    #[error("Backend unavailable after {attempts} attempt(s): {message}")]
    BackendUnavailable {
        /// Attempts made before giving up
        attempts: usize,
        /// Last failure reported by the backend
        message: String,
    },

    /// Non-retryable backend failure
    #[error("Backend error: {0}")]
    Backend(BackendError),

    /// Text exceeds maximum length
    #[error("Text too long: {0} bytes (max: {1})")]
    TextTooLong(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A batch worker task failed to complete
    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl ExtractorError {
    /// Whether the caller may retry the same document later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractorError::BackendTimeout { .. } | ExtractorError::BackendUnavailable { .. }
        )
    }

    /// Wrap a backend error left over after retrying
    pub(crate) fn from_backend(error: BackendError, attempts: usize) -> Self {
        match error {
            BackendError::Timeout => ExtractorError::BackendTimeout { attempts },
            BackendError::Unavailable(message) => {
                ExtractorError::BackendUnavailable { attempts, message }
            }
            other => ExtractorError::Backend(other),
        }
    }
}
