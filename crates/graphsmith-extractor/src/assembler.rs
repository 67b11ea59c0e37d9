//! Turn parsed candidates into a schema-valid node and relationship set

use crate::types::{CandidateSet, NodeCandidate, RelationshipCandidate};
use graphsmith_domain::{
    Attributes, ExtractedNode, ExtractedRelationship, NodeRef, SchemaRegistry,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Candidate counters collected while assembling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AssemblyCounts {
    pub node_candidates: usize,
    pub relationship_candidates: usize,
    pub nodes_dropped: usize,
    pub relationships_dropped: usize,
}

type RelationshipKey = (NodeRef, String, NodeRef);

/// Accumulates candidates from one or more chunks
///
/// - type names and labels are mapped onto their registered spelling
/// - schema violators are dropped with a warning
/// - relationships touching a dropped node are dropped
/// - endpoints never listed as nodes are added without attributes
/// - duplicates merge into the first occurrence; on conflicting attribute
///   values the first value wins
pub(crate) struct GraphAssembler<'r> {
    registry: &'r SchemaRegistry,
    nodes: Vec<ExtractedNode>,
    node_index: HashMap<NodeRef, usize>,
    rejected_nodes: HashSet<NodeRef>,
    relationships: Vec<ExtractedRelationship>,
    relationship_index: HashMap<RelationshipKey, usize>,
    counts: AssemblyCounts,
}

impl<'r> GraphAssembler<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            rejected_nodes: HashSet::new(),
            relationships: Vec::new(),
            relationship_index: HashMap::new(),
            counts: AssemblyCounts::default(),
        }
    }

    /// Add the candidates parsed from one backend response
    pub fn add(&mut self, candidates: CandidateSet) {
        self.counts.node_candidates += candidates.nodes.len();
        self.counts.relationship_candidates += candidates.relationships.len();

        for candidate in candidates.nodes {
            self.add_node(candidate);
        }
        for candidate in candidates.relationships {
            self.add_relationship(candidate);
        }
    }

    pub fn finish(self) -> (Vec<ExtractedNode>, Vec<ExtractedRelationship>, AssemblyCounts) {
        (self.nodes, self.relationships, self.counts)
    }

    fn add_node(&mut self, candidate: NodeCandidate) {
        let node = ExtractedNode {
            node_type: self.canonical_node_type(&candidate.node_type),
            id: candidate.id,
            attributes: candidate.attributes,
        };

        if let Err(violation) = self.registry.validate_node(&node) {
            warn!(node = %node.id, node_type = %node.node_type, %violation, "Dropping node");
            self.counts.nodes_dropped += 1;
            self.rejected_nodes.insert(node.node_ref());
            return;
        }

        self.merge_node(node);
    }

    fn add_relationship(&mut self, candidate: RelationshipCandidate) {
        let label = self
            .registry
            .resolve_label(&candidate.label)
            .map(str::to_string)
            .unwrap_or_else(|| SchemaRegistry::normalize_label(&candidate.label));

        let rel = ExtractedRelationship {
            source: NodeRef::new(
                candidate.source_id,
                self.canonical_node_type(&candidate.source_type),
            ),
            label,
            target: NodeRef::new(
                candidate.target_id,
                self.canonical_node_type(&candidate.target_type),
            ),
            attributes: candidate.attributes,
        };

        if let Err(violation) = self.registry.validate_relationship(&rel) {
            warn!(
                source = %rel.source.id,
                label = %rel.label,
                target = %rel.target.id,
                %violation,
                "Dropping relationship"
            );
            self.counts.relationships_dropped += 1;
            return;
        }

        for endpoint in [&rel.source, &rel.target] {
            if !self.node_index.contains_key(endpoint) && self.rejected_nodes.contains(endpoint) {
                warn!(
                    label = %rel.label,
                    endpoint = %endpoint.id,
                    "Dropping relationship whose endpoint was dropped"
                );
                self.counts.relationships_dropped += 1;
                return;
            }
        }

        for endpoint in [&rel.source, &rel.target] {
            if !self.node_index.contains_key(endpoint) {
                debug!(
                    node = %endpoint.id,
                    node_type = %endpoint.node_type,
                    "Adding implicit endpoint node"
                );
                self.merge_node(ExtractedNode::new(
                    endpoint.id.clone(),
                    endpoint.node_type.clone(),
                ));
            }
        }

        self.merge_relationship(rel);
    }

    fn canonical_node_type(&self, node_type: &str) -> String {
        self.registry
            .resolve_node_type(node_type)
            .unwrap_or(node_type)
            .to_string()
    }

    fn merge_node(&mut self, node: ExtractedNode) {
        let key = node.node_ref();
        match self.node_index.get(&key) {
            Some(&idx) => {
                merge_attributes(&mut self.nodes[idx].attributes, node.attributes, &key.id)
            }
            None => {
                self.node_index.insert(key, self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    fn merge_relationship(&mut self, rel: ExtractedRelationship) {
        let key = (rel.source.clone(), rel.label.clone(), rel.target.clone());
        match self.relationship_index.get(&key) {
            Some(&idx) => {
                merge_attributes(
                    &mut self.relationships[idx].attributes,
                    rel.attributes,
                    &rel.label,
                )
            }
            None => {
                self.relationship_index.insert(key, self.relationships.len());
                self.relationships.push(rel);
            }
        }
    }
}

fn merge_attributes(existing: &mut Attributes, incoming: Attributes, owner: &str) {
    for (key, value) in incoming {
        match existing.get(&key) {
            Some(current) if *current != value => {
                debug!(
                    owner,
                    attribute = %key,
                    kept = %current,
                    ignored = %value,
                    "Conflicting attribute value"
                );
            }
            Some(_) => {}
            None => {
                existing.insert(key, value);
            }
        }
    }
}
