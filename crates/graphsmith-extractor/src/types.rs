//! Intermediate representation of backend output

use graphsmith_domain::Attributes;

/// A node as proposed by the backend, before schema filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeCandidate {
    pub id: String,
    pub node_type: String,
    pub attributes: Attributes,
}

/// A relationship as proposed by the backend, before schema filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelationshipCandidate {
    pub source_id: String,
    pub source_type: String,
    pub label: String,
    pub target_id: String,
    pub target_type: String,
    pub attributes: Attributes,
}

/// Everything parsed out of one backend response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CandidateSet {
    pub nodes: Vec<NodeCandidate>,
    pub relationships: Vec<RelationshipCandidate>,
}
