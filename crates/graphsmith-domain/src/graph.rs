//! Extracted nodes, relationships and the graph document that holds them

use crate::document::Document;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Attribute name to value mapping, ordered by name
pub type Attributes = BTreeMap<String, String>;

/// Reference to a node by its identifying name and type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef {
    /// Identifying name (e.g. `MARIE CURIE`)
    pub id: String,

    /// Node type (e.g. `Person`)
    pub node_type: String,
}

impl NodeRef {
    /// Create a node reference
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
        }
    }
}

/// A typed node produced by extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedNode {
    /// Identifying name
    pub id: String,

    /// Node type; must name a registered node schema
    pub node_type: String,

    /// Attribute values keyed by attribute name
    pub attributes: Attributes,
}

impl ExtractedNode {
    /// Create a node without attributes
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Reference to this node
    pub fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.id.clone(), self.node_type.clone())
    }
}

/// A typed, directed relationship produced by extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRelationship {
    /// Start node
    pub source: NodeRef,

    /// Relationship label
    pub label: String,

    /// End node
    pub target: NodeRef,

    /// Attribute values keyed by attribute name
    pub attributes: Attributes,
}

impl ExtractedRelationship {
    /// Create a relationship without attributes
    pub fn new(source: NodeRef, label: impl Into<String>, target: NodeRef) -> Self {
        Self {
            source,
            label: label.into(),
            target,
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Counters describing how a graph document was produced
///
/// Stats are informational and do not take part in equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Text chunks sent to the backend
    pub chunks: usize,

    /// Backend calls made, including retries
    pub backend_attempts: usize,

    /// Node candidates parsed from backend output
    pub node_candidates: usize,

    /// Relationship candidates parsed from backend output
    pub relationship_candidates: usize,

    /// Node candidates dropped for schema violations
    pub nodes_dropped: usize,

    /// Relationship candidates dropped for schema violations or dropped endpoints
    pub relationships_dropped: usize,

    /// Name of the backend model
    pub model_name: String,

    /// Wall-clock time spent, in milliseconds
    pub elapsed_ms: u64,
}

/// The result of one extraction: typed nodes and relationships tied to a
/// source document
///
/// A `GraphDocument` is immutable once built. Its nodes and relationships
/// have already been filtered through the schema registry.
#[derive(Debug, Clone)]
pub struct GraphDocument {
    source: Arc<Document>,
    nodes: Vec<ExtractedNode>,
    relationships: Vec<ExtractedRelationship>,
    stats: ExtractionStats,
}

impl GraphDocument {
    /// Build a graph document from already validated parts
    pub fn new(
        source: Arc<Document>,
        nodes: Vec<ExtractedNode>,
        relationships: Vec<ExtractedRelationship>,
    ) -> Self {
        Self {
            source,
            nodes,
            relationships,
            stats: ExtractionStats::default(),
        }
    }

    /// Attach extraction stats
    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = stats;
        self
    }

    /// The document this graph was extracted from
    pub fn source(&self) -> &Document {
        &self.source
    }

    /// Nodes in extraction order
    pub fn nodes(&self) -> impl Iterator<Item = &ExtractedNode> {
        self.nodes.iter()
    }

    /// Relationships in extraction order
    pub fn relationships(&self) -> impl Iterator<Item = &ExtractedRelationship> {
        self.relationships.iter()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// True when nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Look up a node by id and type
    pub fn node(&self, id: &str, node_type: &str) -> Option<&ExtractedNode> {
        self.nodes
            .iter()
            .find(|n| n.id == id && n.node_type == node_type)
    }

    /// Relationships carrying `label`
    pub fn relationships_labeled<'a>(
        &'a self,
        label: &'a str,
    ) -> impl Iterator<Item = &'a ExtractedRelationship> + 'a {
        self.relationships.iter().filter(move |r| r.label == label)
    }

    /// How this document was produced
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }
}

impl PartialEq for GraphDocument {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.nodes == other.nodes
            && self.relationships == other.relationships
    }
}

impl Eq for GraphDocument {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphDocument {
        let source = Arc::new(Document::new("Marie Curie married Pierre Curie."));
        let marie =
            ExtractedNode::new("MARIE CURIE", "Person").with_attribute("birth_year", "1867");
        let pierre = ExtractedNode::new("PIERRE CURIE", "Person");
        let spouse = ExtractedRelationship::new(marie.node_ref(), "SPOUSE_OF", pierre.node_ref());
        GraphDocument::new(source, vec![marie, pierre], vec![spouse])
    }

    #[test]
    fn test_graph_document_accessors() {
        let graph = sample();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.relationship_count(), 1);
        assert!(!graph.is_empty());

        let marie = graph.node("MARIE CURIE", "Person").unwrap();
        assert_eq!(marie.attributes.get("birth_year").map(String::as_str), Some("1867"));
        assert!(graph.node("MARIE CURIE", "Location").is_none());

        assert_eq!(graph.relationships_labeled("SPOUSE_OF").count(), 1);
        assert_eq!(graph.relationships_labeled("MEMBER_OF").count(), 0);
    }

    #[test]
    fn test_equality_ignores_stats() {
        let a = sample();
        let b = a.clone().with_stats(ExtractionStats {
            elapsed_ms: 99,
            ..Default::default()
        });
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_graph() {
        let graph = GraphDocument::new(Arc::new(Document::new("")), Vec::new(), Vec::new());
        assert!(graph.is_empty());
        assert_eq!(graph.nodes().count(), 0);
    }
}
