//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text chunking strategy for large documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Split by paragraphs (double newlines)
    #[default]
    ByParagraph,
    /// Split by sections (markdown headers or numbered sections)
    BySection,
    /// Split at sentence boundaries
    BySentence,
}

/// Configuration for the Extractor
///
/// Sizes are measured in bytes of UTF-8 text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length
    pub max_text_length: usize,

    /// Maximum chunk size; longer documents are split
    pub max_chunk_size: usize,

    /// Text chunking strategy for large documents
    pub chunk_strategy: ChunkStrategy,

    /// Maximum time for a single backend call (seconds)
    pub request_timeout_secs: u64,

    /// Extra attempts after a timed-out or unavailable backend call
    pub max_retries: u32,

    /// First retry delay (milliseconds); doubled on every retry
    pub initial_backoff_ms: u64,

    /// Upper bound for the retry delay (milliseconds)
    pub max_backoff_ms: u64,

    /// Documents extracted at the same time by `extract_batch`
    pub max_concurrency: usize,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.max_chunk_size > self.max_text_length {
            return Err("max_chunk_size cannot exceed max_text_length".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err("initial_backoff_ms cannot exceed max_backoff_ms".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            max_chunk_size: 10_000,
            chunk_strategy: ChunkStrategy::ByParagraph,
            request_timeout_secs: 120,
            max_retries: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            max_concurrency: 4,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter timeouts, smaller chunks, fewer retries
    pub fn aggressive() -> Self {
        Self {
            max_text_length: 20_000,
            max_chunk_size: 4_000,
            chunk_strategy: ChunkStrategy::ByParagraph,
            request_timeout_secs: 45,
            max_retries: 1,
            initial_backoff_ms: 500,
            max_backoff_ms: 5_000,
            max_concurrency: 8,
        }
    }

    /// Lenient preset: longer timeouts, larger chunks, more retries
    pub fn lenient() -> Self {
        Self {
            max_text_length: 100_000,
            max_chunk_size: 20_000,
            chunk_strategy: ChunkStrategy::BySection,
            request_timeout_secs: 300,
            max_retries: 5,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 60_000,
            max_concurrency: 2,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
