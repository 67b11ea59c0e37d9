//! Graphsmith Backend Layer
//!
//! Implementations of the `TextCompletionBackend` trait from
//! `graphsmith-domain`.
//!
//! # Backends
//!
//! - `MockBackend`: deterministic fake for tests and demos
//! - `OpenAiBackend`: OpenAI-compatible chat-completions API
//!
//! # Examples
//!
//! ```
//! use graphsmith_llm::MockBackend;
//! use graphsmith_domain::TextCompletionBackend;
//!
//! # tokio_test::block_on(async {
//! let backend = MockBackend::new(r#"{"nodes": [], "relationships": []}"#);
//! let result = backend.complete("any prompt").await.unwrap();
//! assert!(result.contains("nodes"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use graphsmith_domain::{BackendError, TextCompletionBackend};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use openai::{OpenAiBackend, OpenAiBackendBuilder};

/// Errors raised while configuring a backend
#[derive(Error, Debug)]
pub enum LlmError {
    /// The HTTP client could not be created
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Backend settings are unusable
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, Result<String, BackendError>)>,
    script: VecDeque<Result<String, BackendError>>,
    prompts: Vec<String>,
}

/// Mock backend for deterministic testing
///
/// Returns pre-configured responses without any network calls. Lookup order
/// for each prompt:
///
/// 1. the next scripted outcome, if any (see [`push_outcome`](Self::push_outcome))
/// 2. the first rule whose needle occurs in the prompt
/// 3. the default response
///
/// # Examples
///
/// ```
/// use graphsmith_llm::MockBackend;
/// use graphsmith_domain::{BackendError, TextCompletionBackend};
///
/// # tokio_test::block_on(async {
/// let backend = MockBackend::new("default");
/// backend.add_response("Pierre", "about pierre");
/// backend.push_outcome(Err(BackendError::Timeout));
///
/// assert_eq!(backend.complete("x").await, Err(BackendError::Timeout));
/// assert_eq!(backend.complete("text about Pierre").await.unwrap(), "about pierre");
/// assert_eq!(backend.complete("x").await.unwrap(), "default");
/// assert_eq!(backend.call_count(), 3);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_response: String,
    model_name: String,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a mock that answers every prompt with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model_name: "mock".to_string(),
            delay: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Override the reported model name
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Sleep before every answer (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer prompts containing `needle` with `response`
    pub fn add_response(&self, needle: impl Into<String>, response: impl Into<String>) {
        self.state()
            .rules
            .push((needle.into(), Ok(response.into())));
    }

    /// Fail prompts containing `needle` with `error`
    pub fn add_error(&self, needle: impl Into<String>, error: BackendError) {
        self.state().rules.push((needle.into(), Err(error)));
    }

    /// Queue an outcome returned by the next call regardless of prompt
    pub fn push_outcome(&self, outcome: Result<String, BackendError>) {
        self.state().script.push_back(outcome);
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.state().prompts.len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.state().prompts.clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        self.state().prompts.clear();
    }

    // Ignore poisoning
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(r#"{"nodes": [], "relationships": []}"#)
    }
}

#[async_trait]
impl TextCompletionBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        state.prompts.push(prompt.to_string());

        if let Some(outcome) = state.script.pop_front() {
            return outcome;
        }

        if let Some((_, outcome)) = state
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
        {
            return outcome.clone();
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
