//! OpenAI-compatible chat-completions backend
//!
//! Talks to any server exposing `POST {base_url}/chat/completions` in the
//! OpenAI format (OpenAI itself, vLLM, LM Studio, Ollama's `/v1`, ...).
//!
//! # Features
//!
//! - Configurable base URL, model, temperature and API key
//! - Per-request HTTP timeout
//! - HTTP status mapped onto retryable / non-retryable [`BackendError`]s
//!
//! Retries are not done here; the extractor owns the retry policy.
//!
//! # Examples
//!
//! ```no_run
//! use graphsmith_llm::OpenAiBackend;
//!
//! let backend = OpenAiBackend::builder("http://localhost:11434/v1", "llama3.1")
//!     .temperature(0.0)
//!     .build()
//!     .unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use graphsmith_domain::{BackendError, TextCompletionBackend};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default HTTP timeout for a single request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Backend for OpenAI-compatible chat-completions APIs
#[derive(Clone)]
pub struct OpenAiBackend {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
    client: reqwest::Client,
}

/// Builder for [`OpenAiBackend`]
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl OpenAiBackendBuilder {
    /// Set the bearer token sent in `Authorization`
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sampling temperature (0 for deterministic output)
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap on generated tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// HTTP timeout for one request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the backend
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidConfig`] for an empty base URL or model, or
    /// a negative temperature, and [`LlmError::Client`] if the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<OpenAiBackend, LlmError> {
        if self.base_url.trim().is_empty() {
            return Err(LlmError::InvalidConfig("base_url is empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::InvalidConfig("model is empty".to_string()));
        }
        if self.temperature < 0.0 {
            return Err(LlmError::InvalidConfig(format!(
                "temperature {} must not be negative",
                self.temperature
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(OpenAiBackend {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model: self.model,
            api_key: self.api_key,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            client,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiBackend {
    /// Start building a backend for `base_url` and `model`
    pub fn builder(base_url: impl Into<String>, model: impl Into<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            temperature: 0.0,
            max_tokens: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Endpoint receiving completion requests
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Configured temperature
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        }
    }
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[async_trait]
impl TextCompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let url = self.endpoint();
        let mut request = self.client.post(&url).json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, &body));
        }

        let body = response.text().await.map_err(map_transport_error)?;
        debug!("Backend {} answered with {} bytes", self.model, body.len());
        parse_chat_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn map_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Unavailable(format!("Request failed: {}", e))
    }
}

/// Map a non-success HTTP status onto a backend error
fn map_status(status: StatusCode, body: &str) -> BackendError {
    let message = format!("HTTP {}: {}", status, body);
    if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        BackendError::Timeout
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        BackendError::Unavailable(message)
    } else {
        BackendError::Rejected(message)
    }
}

/// Pull the first choice's content out of a chat-completions body
fn parse_chat_response(body: &str) -> Result<String, BackendError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| BackendError::InvalidResponse("Response has no message content".to_string()))
}
