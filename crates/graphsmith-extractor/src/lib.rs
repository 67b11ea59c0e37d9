//! Graphsmith Extractor
//!
//! Turns unstructured documents into schema-constrained property graphs using
//! a text-completion backend.
//!
//! # Overview
//!
//! The caller declares which node types and relationship triples are
//! allowed. The extractor renders those schemas and the document into a
//! prompt, asks the backend for a JSON graph, and keeps only the nodes and
//! relationships the registry admits.
//!
//! # Architecture
//!
//! ```text
//! Document → chunks → prompt → Backend → candidates → registry filter → GraphDocument
//! ```
//!
//! # Key Features
//!
//! - **Schema enforcement**: undeclared types, triples and attributes never reach the output
//! - **Chunking**: long documents are split and the partial graphs merged
//! - **Retries**: timeouts and unavailable backends are retried with backoff
//! - **Batch extraction**: many documents with bounded concurrency
//!
//! # Example Usage
//!
//! ```no_run
//! use graphsmith_domain::{Document, NodeSchema, RelationshipSchema, SchemaRegistry};
//! use graphsmith_extractor::{ExtractorConfig, GraphExtractor};
//! use graphsmith_llm::MockBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::register(
//!     vec![NodeSchema::new("Person", ["name", "birth_year"])],
//!     vec![RelationshipSchema::new("Person", "SPOUSE_OF", "Person")],
//! )?;
//!
//! let backend = MockBackend::new(r#"{"nodes": [], "relationships": []}"#);
//! let extractor = GraphExtractor::new(backend, registry, ExtractorConfig::default())?
//!     .with_instructions("- all names must be extracted as uppercase");
//!
//! let graph = extractor
//!     .extract(Document::new("Marie Curie was married to Pierre Curie."))
//!     .await?;
//!
//! println!("Nodes: {}", graph.node_count());
//! println!("Relationships: {}", graph.relationship_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assembler;
mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod retry;
mod schema_file;
mod types;


pub use chunking::TextChunker;
pub use config::{ChunkStrategy, ExtractorConfig};
pub use error::ExtractorError;
pub use extractor::GraphExtractor;
pub use prompt::{schema_json, PromptBuilder, DOCUMENT_CLOSE, DOCUMENT_OPEN};
pub use retry::RetryPolicy;
pub use schema_file::{NodeEntry, RelationshipEntry, SchemaFile};
