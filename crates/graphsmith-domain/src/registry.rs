//! Schema registry: the allowed vocabulary for extraction output

use crate::graph::{ExtractedNode, ExtractedRelationship};
use crate::schema::{NodeSchema, RelationshipSchema, SchemaError};
use std::collections::HashSet;
use thiserror::Error;

/// A schema constraint violated by an extracted node or relationship
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// Node type is not registered
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Node id is empty
    #[error("Empty node id for type {0}")]
    EmptyNodeId(String),

    /// No registered relationship matches the triple
    #[error("Unknown relationship: ({source_type})-[{label}]->({target_type})")]
    UnknownRelationship {
        /// Source node type
        source_type: String,
        /// Relationship label
        label: String,
        /// Target node type
        target_type: String,
    },

    /// Attribute key outside the schema's vocabulary
    #[error("Attribute '{attribute}' is not allowed on {owner}")]
    DisallowedAttribute {
        /// Node type or relationship label
        owner: String,
        /// Offending attribute key
        attribute: String,
    },
}

/// Registered node and relationship schemas
///
/// Built once at configuration time and read-only afterwards. Share it
/// across extractions behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    nodes: Vec<NodeSchema>,
    relationships: Vec<RelationshipSchema>,
}

impl SchemaRegistry {
    /// Validate and register schemas
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a name is empty, a node type or
    /// relationship triple is declared twice, an attribute repeats inside
    /// one schema, or a relationship references an undeclared node type.
    ///
    /// # Examples
    ///
    /// ```
    /// use graphsmith_domain::{NodeSchema, RelationshipSchema, SchemaRegistry};
    ///
    /// let registry = SchemaRegistry::register(
    ///     vec![NodeSchema::new("Person", ["name"])],
    ///     vec![RelationshipSchema::new("Person", "SPOUSE_OF", "Person")],
    /// ).unwrap();
    /// assert_eq!(registry.node_schemas().count(), 1);
    ///
    /// let err = SchemaRegistry::register(
    ///     vec![NodeSchema::new("Person", ["name"])],
    ///     vec![RelationshipSchema::new("Person", "MEMBER_OF", "Organization")],
    /// );
    /// assert!(err.is_err());
    /// ```
    pub fn register(
        nodes: Vec<NodeSchema>,
        relationships: Vec<RelationshipSchema>,
    ) -> Result<Self, SchemaError> {
        let mut node_names = HashSet::new();
        for node in &nodes {
            if node.name.trim().is_empty() {
                return Err(SchemaError::EmptyName("node schema".to_string()));
            }
            if !node_names.insert(node.name.as_str()) {
                return Err(SchemaError::DuplicateNodeType(node.name.clone()));
            }
            check_attributes(&node.name, &node.attributes)?;
        }

        // Labels are stored normalized
        let relationships: Vec<RelationshipSchema> = relationships
            .into_iter()
            .map(|mut rel| {
                rel.label = Self::normalize_label(&rel.label);
                rel
            })
            .collect();

        let mut triples = HashSet::new();
        for rel in &relationships {
            if rel.label.trim().is_empty() {
                return Err(SchemaError::EmptyName(format!(
                    "relationship ({})->({})",
                    rel.source_type, rel.target_type
                )));
            }
            for endpoint in [&rel.source_type, &rel.target_type] {
                if !node_names.contains(endpoint.as_str()) {
                    return Err(SchemaError::UndeclaredEndpoint {
                        label: rel.label.clone(),
                        node_type: endpoint.clone(),
                    });
                }
            }
            let triple = (
                rel.source_type.as_str(),
                rel.label.as_str(),
                rel.target_type.as_str(),
            );
            if !triples.insert(triple) {
                return Err(SchemaError::DuplicateRelationship {
                    source_type: rel.source_type.clone(),
                    label: rel.label.clone(),
                    target_type: rel.target_type.clone(),
                });
            }
            check_attributes(&rel.label, &rel.attributes)?;
        }

        Ok(Self {
            nodes,
            relationships,
        })
    }

    /// Registered node schemas in declaration order
    pub fn node_schemas(&self) -> impl Iterator<Item = &NodeSchema> {
        self.nodes.iter()
    }

    /// Registered relationship schemas in declaration order
    pub fn relationship_schemas(&self) -> impl Iterator<Item = &RelationshipSchema> {
        self.relationships.iter()
    }

    /// Find a node schema by exact type name
    pub fn node_schema(&self, name: &str) -> Option<&NodeSchema> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Find the relationship schema for an exact triple
    pub fn relationship_schema(
        &self,
        source_type: &str,
        label: &str,
        target_type: &str,
    ) -> Option<&RelationshipSchema> {
        self.relationships
            .iter()
            .find(|r| r.matches(source_type, label, target_type))
    }

    /// Map a backend-supplied node type onto its registered name
    ///
    /// Exact matches win; otherwise an ASCII case-insensitive match is
    /// accepted (`person` resolves to `Person`).
    pub fn resolve_node_type(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.node_schema(name)
            .or_else(|| self.nodes.iter().find(|n| n.name.eq_ignore_ascii_case(name)))
            .map(|n| n.name.as_str())
    }

    /// Map a backend-supplied relationship label onto its registered form
    ///
    /// Registered labels are already normalized; `label` is passed through
    /// [`normalize_label`](Self::normalize_label) before comparing.
    pub fn resolve_label(&self, label: &str) -> Option<&str> {
        let wanted = Self::normalize_label(label);
        self.relationships
            .iter()
            .find(|r| r.label == wanted)
            .map(|r| r.label.as_str())
    }

    /// Uppercase a label and replace spaces and hyphens with underscores
    ///
    /// ```
    /// use graphsmith_domain::SchemaRegistry;
    ///
    /// assert_eq!(SchemaRegistry::normalize_label(" spouse of "), "SPOUSE_OF");
    /// assert_eq!(SchemaRegistry::normalize_label("located-in"), "LOCATED_IN");
    /// ```
    pub fn normalize_label(label: &str) -> String {
        label
            .trim()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
            .to_uppercase()
    }

    /// Check a node against the registry
    pub fn validate_node(&self, node: &ExtractedNode) -> Result<(), SchemaViolation> {
        let schema = self
            .node_schema(&node.node_type)
            .ok_or_else(|| SchemaViolation::UnknownNodeType(node.node_type.clone()))?;

        if node.id.trim().is_empty() {
            return Err(SchemaViolation::EmptyNodeId(node.node_type.clone()));
        }

        if let Some(key) = node.attributes.keys().find(|k| !schema.allows(k)) {
            return Err(SchemaViolation::DisallowedAttribute {
                owner: schema.name.clone(),
                attribute: key.clone(),
            });
        }

        Ok(())
    }

    /// Check a relationship against the registry
    pub fn validate_relationship(
        &self,
        rel: &ExtractedRelationship,
    ) -> Result<(), SchemaViolation> {
        let schema = self
            .relationship_schema(&rel.source.node_type, &rel.label, &rel.target.node_type)
            .ok_or_else(|| SchemaViolation::UnknownRelationship {
                source_type: rel.source.node_type.clone(),
                label: rel.label.clone(),
                target_type: rel.target.node_type.clone(),
            })?;

        for endpoint in [&rel.source, &rel.target] {
            if endpoint.id.trim().is_empty() {
                return Err(SchemaViolation::EmptyNodeId(endpoint.node_type.clone()));
            }
        }

        if let Some(key) = rel.attributes.keys().find(|k| !schema.allows(k)) {
            return Err(SchemaViolation::DisallowedAttribute {
                owner: schema.label.clone(),
                attribute: key.clone(),
            });
        }

        Ok(())
    }
}

fn check_attributes(owner: &str, attributes: &[String]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for attribute in attributes {
        if !seen.insert(attribute.as_str()) {
            return Err(SchemaError::DuplicateAttribute {
                owner: owner.to_string(),
                attribute: attribute.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeRef;

    fn curie_registry() -> SchemaRegistry {
        SchemaRegistry::register(
            vec![
                NodeSchema::new(
                    "Person",
                    ["name", "birth_year", "death_year", "nationality", "profession"],
                ),
                NodeSchema::new("Organization", ["name", "founding_year", "industry"])
                    .with_description("Represents a group, company, or institution"),
                NodeSchema::new("Location", ["name"]),
                NodeSchema::new("Award", ["name", "field"]),
            ],
            vec![
                RelationshipSchema::new("Person", "SPOUSE_OF", "Person"),
                RelationshipSchema::new("Person", "MEMBER_OF", "Organization")
                    .with_attributes(["start_year", "end_year", "year"]),
                RelationshipSchema::new("Person", "AWARDED", "Award").with_attributes(["year"]),
                RelationshipSchema::new("Person", "LOCATED_IN", "Location"),
                RelationshipSchema::new("Organization", "LOCATED_IN", "Location"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_register_valid_schemas() {
        let registry = curie_registry();
        assert_eq!(registry.node_schemas().count(), 4);
        assert_eq!(registry.relationship_schemas().count(), 5);
    }

    #[test]
    fn test_register_duplicate_node_type() {
        let result = SchemaRegistry::register(
            vec![NodeSchema::new("Person", ["name"]), NodeSchema::new("Person", ["age"])],
            vec![],
        );
        assert_eq!(result, Err(SchemaError::DuplicateNodeType("Person".to_string())));
    }

    #[test]
    fn test_register_duplicate_relationship() {
        let result = SchemaRegistry::register(
            vec![NodeSchema::new("Person", ["name"])],
            vec![
                RelationshipSchema::new("Person", "SPOUSE_OF", "Person"),
                RelationshipSchema::new("Person", "SPOUSE_OF", "Person").with_attributes(["since"]),
            ],
        );
        assert!(matches!(result, Err(SchemaError::DuplicateRelationship { .. })));
    }

    #[test]
    fn test_same_label_different_endpoints_is_allowed() {
        let registry = curie_registry();
        assert!(registry.relationship_schema("Person", "LOCATED_IN", "Location").is_some());
        assert!(registry.relationship_schema("Organization", "LOCATED_IN", "Location").is_some());
    }

    #[test]
    fn test_register_undeclared_endpoint() {
        let result = SchemaRegistry::register(
            vec![NodeSchema::new("Person", ["name"])],
            vec![RelationshipSchema::new("Person", "MEMBER_OF", "Organization")],
        );
        assert_eq!(
            result,
            Err(SchemaError::UndeclaredEndpoint {
                label: "MEMBER_OF".to_string(),
                node_type: "Organization".to_string(),
            })
        );
    }

    #[test]
    fn test_register_empty_names() {
        assert!(matches!(
            SchemaRegistry::register(vec![NodeSchema::new("  ", ["name"])], vec![]),
            Err(SchemaError::EmptyName(_))
        ));
        assert!(matches!(
            SchemaRegistry::register(
                vec![NodeSchema::new("Person", ["name"])],
                vec![RelationshipSchema::new("Person", "", "Person")],
            ),
            Err(SchemaError::EmptyName(_))
        ));
    }

    #[test]
    fn test_register_duplicate_attribute() {
        let result =
            SchemaRegistry::register(vec![NodeSchema::new("Award", ["name", "name"])], vec![]);
        assert!(matches!(result, Err(SchemaError::DuplicateAttribute { .. })));
    }

    #[test]
    fn test_validate_node() {
        let registry = curie_registry();

        let ok = ExtractedNode::new("MARIE CURIE", "Person").with_attribute("birth_year", "1867");
        assert!(registry.validate_node(&ok).is_ok());

        let unknown = ExtractedNode::new("NOBEL COMMITTEE", "Committee");
        assert_eq!(
            registry.validate_node(&unknown),
            Err(SchemaViolation::UnknownNodeType("Committee".to_string()))
        );

        let bad_attr =
            ExtractedNode::new("MARIE CURIE", "Person").with_attribute("spouse", "PIERRE");
        assert_eq!(
            registry.validate_node(&bad_attr),
            Err(SchemaViolation::DisallowedAttribute {
                owner: "Person".to_string(),
                attribute: "spouse".to_string(),
            })
        );

        let empty_id = ExtractedNode::new(" ", "Person");
        assert!(matches!(registry.validate_node(&empty_id), Err(SchemaViolation::EmptyNodeId(_))));
    }

    #[test]
    fn test_validate_relationship() {
        let registry = curie_registry();
        let marie = NodeRef::new("MARIE CURIE", "Person");
        let pierre = NodeRef::new("PIERRE CURIE", "Person");
        let paris = NodeRef::new("UNIVERSITY OF PARIS", "Organization");

        let spouse = ExtractedRelationship::new(marie.clone(), "SPOUSE_OF", pierre.clone());
        assert!(registry.validate_relationship(&spouse).is_ok());

        let member = ExtractedRelationship::new(marie.clone(), "MEMBER_OF", paris.clone())
            .with_attribute("start_year", "1906");
        assert!(registry.validate_relationship(&member).is_ok());

        // Endpoint types reversed
        let reversed = ExtractedRelationship::new(paris, "MEMBER_OF", marie.clone());
        assert!(matches!(
            registry.validate_relationship(&reversed),
            Err(SchemaViolation::UnknownRelationship { .. })
        ));

        let bad_attr =
            ExtractedRelationship::new(marie, "SPOUSE_OF", pierre).with_attribute("year", "1895");
        assert_eq!(
            registry.validate_relationship(&bad_attr),
            Err(SchemaViolation::DisallowedAttribute {
                owner: "SPOUSE_OF".to_string(),
                attribute: "year".to_string(),
            })
        );
    }

    #[test]
    fn test_resolve_node_type() {
        let registry = curie_registry();
        assert_eq!(registry.resolve_node_type("Person"), Some("Person"));
        assert_eq!(registry.resolve_node_type("person"), Some("Person"));
        assert_eq!(registry.resolve_node_type(" AWARD "), Some("Award"));
        assert_eq!(registry.resolve_node_type("Company"), None);
    }

    #[test]
    fn test_resolve_label() {
        let registry = curie_registry();
        assert_eq!(registry.resolve_label("SPOUSE_OF"), Some("SPOUSE_OF"));
        assert_eq!(registry.resolve_label("spouse of"), Some("SPOUSE_OF"));
        assert_eq!(registry.resolve_label("Located-In"), Some("LOCATED_IN"));
        assert_eq!(registry.resolve_label("MARRIED_TO"), None);
    }

    #[test]
    fn test_register_normalizes_labels() {
        let registry = SchemaRegistry::register(
            vec![NodeSchema::new("Person", ["name"])],
            vec![RelationshipSchema::new("Person", "spouse of", "Person")],
        )
        .unwrap();

        assert_eq!(registry.resolve_label("SPOUSE_OF"), Some("SPOUSE_OF"));
        assert_eq!(registry.resolve_label("spouse-of"), Some("SPOUSE_OF"));
        assert!(registry
            .relationship_schema("Person", "SPOUSE_OF", "Person")
            .is_some());
    }

    #[test]
    fn test_register_duplicate_after_normalization() {
        let result = SchemaRegistry::register(
            vec![NodeSchema::new("Person", ["name"])],
            vec![
                RelationshipSchema::new("Person", "spouse of", "Person"),
                RelationshipSchema::new("Person", "SPOUSE_OF", "Person"),
            ],
        );
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateRelationship { .. })
        ));
    }
}
