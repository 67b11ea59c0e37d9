//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction error
    #[error("{0}")]
    Extractor(#[from] graphsmith_extractor::ExtractorError),

    /// Backend construction error
    #[error("Backend error: {0}")]
    Backend(#[from] graphsmith_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Some documents of a batch failed
    #[error("{failed} of {total} document(s) failed to extract")]
    PartialFailure {
        /// Documents that failed
        failed: usize,
        /// Documents attempted
        total: usize,
    },
}
