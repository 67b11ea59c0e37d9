//! Core GraphExtractor implementation

use crate::assembler::GraphAssembler;
use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_backend_response;
use crate::prompt::PromptBuilder;
use crate::retry::RetryPolicy;
use graphsmith_domain::{
    BackendError, Document, ExtractionStats, GraphDocument, SchemaRegistry, TextCompletionBackend,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Extracts schema-constrained graphs from documents
///
/// Cloning is cheap: the backend and registry are shared.
pub struct GraphExtractor<B> {
    backend: Arc<B>,
    registry: Arc<SchemaRegistry>,
    config: ExtractorConfig,
    instructions: Option<Arc<str>>,
    retry: RetryPolicy,
}

impl<B> Clone for GraphExtractor<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
            instructions: self.instructions.clone(),
            retry: self.retry.clone(),
        }
    }
}

impl<B> GraphExtractor<B>
where
    B: TextCompletionBackend,
{
    /// Create a new GraphExtractor
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Config`] if `config` fails validation.
    pub fn new(
        backend: B,
        registry: impl Into<Arc<SchemaRegistry>>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let retry = RetryPolicy::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        );

        Ok(Self {
            backend: Arc::new(backend),
            registry: registry.into(),
            config,
            instructions: None,
            retry,
        })
    }

    /// Add free-text instructions included in every prompt
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions: String = instructions.into();
        self.instructions = if instructions.trim().is_empty() {
            None
        } else {
            Some(Arc::from(instructions))
        };
        self
    }

    /// The registry used for prompts and filtering
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a graph from one document
    ///
    /// Documents longer than `max_chunk_size` are split and each chunk is
    /// extracted separately; the partial graphs are merged.
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::TextTooLong`] if the document exceeds `max_text_length`
    /// - [`ExtractorError::ExtractionParse`] if backend output is malformed
    /// - [`ExtractorError::BackendTimeout`] / [`ExtractorError::BackendUnavailable`]
    ///   once retries are exhausted
    pub async fn extract(
        &self,
        document: impl Into<Arc<Document>>,
    ) -> Result<GraphDocument, ExtractorError> {
        let document: Arc<Document> = document.into();
        let started = Instant::now();
        let text = document.text();

        if text.len() > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                text.len(),
                self.config.max_text_length,
            ));
        }

        info!(
            document = %document.id(),
            bytes = text.len(),
            model = self.backend.model_name(),
            "Starting graph extraction"
        );

        let chunks = if text.trim().is_empty() {
            Vec::new()
        } else if text.len() <= self.config.max_chunk_size {
            vec![text.to_string()]
        } else {
            let chunks = TextChunker::new(self.config.chunk_strategy, self.config.max_chunk_size)
                .chunk(text);
            info!("Text exceeds max chunk size, split into {} chunks", chunks.len());
            chunks
        };

        let mut assembler = GraphAssembler::new(&self.registry);
        let mut backend_attempts = 0;

        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Processing chunk {}/{}", idx + 1, chunks.len());

            let prompt = PromptBuilder::new(&self.registry, chunk)
                .with_instructions(self.instructions.as_deref())
                .build();
            debug!("Prompt length: {} chars", prompt.len());

            let (response, attempts) = self.complete_with_retry(&prompt).await;
            backend_attempts += attempts;
            let response = response.map_err(|e| ExtractorError::from_backend(e, attempts))?;
            debug!("Backend response length: {} chars", response.len());

            assembler.add(parse_backend_response(&response)?);
        }

        let (nodes, relationships, counts) = assembler.finish();
        let stats = ExtractionStats {
            chunks: chunks.len(),
            backend_attempts,
            node_candidates: counts.node_candidates,
            relationship_candidates: counts.relationship_candidates,
            nodes_dropped: counts.nodes_dropped,
            relationships_dropped: counts.relationships_dropped,
            model_name: self.backend.model_name().to_string(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            document = %document.id(),
            nodes = nodes.len(),
            relationships = relationships.len(),
            nodes_dropped = stats.nodes_dropped,
            relationships_dropped = stats.relationships_dropped,
            "Extraction complete"
        );

        Ok(GraphDocument::new(document, nodes, relationships).with_stats(stats))
    }

    /// Call the backend under the request timeout, retrying transient failures
    async fn complete_with_retry(&self, prompt: &str) -> (Result<String, BackendError>, usize) {
        let backend = &self.backend;
        let request_timeout = self.config.request_timeout();

        self.retry
            .retry("complete", || async move {
                match timeout(request_timeout, backend.complete(prompt)).await {
                    Ok(result) => result,
                    Err(_) => Err(BackendError::Timeout),
                }
            })
            .await
    }
}

impl<B> GraphExtractor<B>
where
    B: TextCompletionBackend + 'static,
{
    /// Extract graphs from many documents with bounded concurrency
    ///
    /// At most `max_concurrency` documents are in flight. The returned
    /// vector is indexed by input position; each document succeeds or fails
    /// on its own.
    pub async fn extract_batch<I, D>(
        &self,
        documents: I,
    ) -> Vec<Result<GraphDocument, ExtractorError>>
    where
        I: IntoIterator<Item = D>,
        D: Into<Arc<Document>>,
    {
        let documents: Vec<Arc<Document>> = documents.into_iter().map(Into::into).collect();
        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();

        info!(
            documents = total,
            max_concurrency = self.config.max_concurrency,
            "Starting batch extraction"
        );

        for (idx, document) in documents.into_iter().enumerate() {
            let extractor = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return (idx, Err(ExtractorError::Task(e.to_string()))),
                };
                (idx, extractor.extract(document).await)
            });
        }

        let mut results: Vec<Option<Result<GraphDocument, ExtractorError>>> =
            (0..total).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => results[idx] = Some(result),
                Err(e) => error!("Extraction task failed: {}", e),
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(ExtractorError::Task("extraction task did not complete".to_string()))
                })
            })
            .collect()
    }
}
