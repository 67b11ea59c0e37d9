//! Graphsmith Domain Layer
//!
//! Core model for schema-constrained graph extraction. This crate holds the
//! value types and trait interfaces every other layer depends upon, and
//! nothing that talks to the network.
//!
//! ## Key Concepts
//!
//! - **Node schema**: a declared entity type with its allowed attributes
//! - **Relationship schema**: a declared (source type, label, target type) triple
//! - **Schema registry**: the validated set of schemas, used to filter output
//! - **Graph document**: typed nodes and relationships tied to one source document
//! - **Backend**: the text-completion service that performs extraction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod graph;
pub mod registry;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use document::{Document, DocumentId};
pub use graph::{
    Attributes, ExtractedNode, ExtractedRelationship, ExtractionStats, GraphDocument, NodeRef,
};
pub use registry::{SchemaRegistry, SchemaViolation};
pub use schema::{NodeSchema, RelationshipSchema, SchemaError};
pub use traits::{BackendError, TextCompletionBackend};
