//! Node and relationship schemas

use thiserror::Error;

/// Declared entity type with its allowed attribute vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSchema {
    /// Type name (e.g. `Person`)
    pub name: String,

    /// Allowed attribute names, in declaration order
    pub attributes: Vec<String>,

    /// Optional free-text description shown to the model
    pub description: Option<String>,
}

impl NodeSchema {
    /// Create a node schema without description
    ///
    /// # Examples
    ///
    /// ```
    /// use graphsmith_domain::NodeSchema;
    ///
    /// let person = NodeSchema::new("Person", ["name", "birth_year"]);
    /// assert!(person.allows("birth_year"));
    /// assert!(!person.allows("salary"));
    /// ```
    pub fn new<I, S>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether `attribute` is in this schema's vocabulary
    pub fn allows(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// Declared (source type, label, target type) triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipSchema {
    /// Node type the relationship starts from
    pub source_type: String,

    /// Relationship label (e.g. `SPOUSE_OF`)
    pub label: String,

    /// Node type the relationship points to
    pub target_type: String,

    /// Allowed attribute names, in declaration order
    pub attributes: Vec<String>,
}

impl RelationshipSchema {
    /// Create a relationship schema without attributes
    pub fn new(
        source_type: impl Into<String>,
        label: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            source_type: source_type.into(),
            label: label.into(),
            target_type: target_type.into(),
            attributes: Vec::new(),
        }
    }

    /// Set the allowed attributes
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `attribute` is in this schema's vocabulary
    pub fn allows(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }

    /// Whether this schema covers the given triple
    pub fn matches(&self, source_type: &str, label: &str, target_type: &str) -> bool {
        self.source_type == source_type && self.label == label && self.target_type == target_type
    }
}

/// Errors raised while building a [`SchemaRegistry`](crate::SchemaRegistry)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two node schemas share a type name
    #[error("Duplicate node type: {0}")]
    DuplicateNodeType(String),

    /// Two relationship schemas share the same triple
    #[error("Duplicate relationship: ({source_type})-[{label}]->({target_type})")]
    DuplicateRelationship {
        /// Source node type
        source_type: String,
        /// Relationship label
        label: String,
        /// Target node type
        target_type: String,
    },

    /// A relationship endpoint names a node type that was never declared
    #[error("Relationship {label} references undeclared node type: {node_type}")]
    UndeclaredEndpoint {
        /// Relationship label
        label: String,
        /// The missing node type
        node_type: String,
    },

    /// A type name or label is empty
    #[error("Empty name in {0}")]
    EmptyName(String),

    /// An attribute appears twice in one schema
    #[error("Duplicate attribute '{attribute}' in {owner}")]
    DuplicateAttribute {
        /// Schema the attribute belongs to
        owner: String,
        /// Repeated attribute name
        attribute: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_schema_allows() {
        let schema = NodeSchema::new("Organization", ["name", "founding_year"])
            .with_description("Represents a group, company, or institution");

        assert!(schema.allows("name"));
        assert!(!schema.allows("Name"));
        assert_eq!(
            schema.description.as_deref(),
            Some("Represents a group, company, or institution")
        );
    }

    #[test]
    fn test_relationship_schema_matches() {
        let schema =
            RelationshipSchema::new("Person", "AWARDED", "Award").with_attributes(["year"]);

        assert!(schema.matches("Person", "AWARDED", "Award"));
        assert!(!schema.matches("Award", "AWARDED", "Person"));
        assert!(schema.allows("year"));
        assert!(!schema.allows("field"));
    }

    #[test]
    fn test_schema_error_messages() {
        let err = SchemaError::UndeclaredEndpoint {
            label: "WORKS_AT".to_string(),
            node_type: "Company".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Relationship WORKS_AT references undeclared node type: Company"
        );
    }
}
