//! TOML schema files
//!
//! ```toml
//! [[nodes]]
//! name = "Person"
//! attributes = ["name", "birth_year"]
//!
//! [[nodes]]
//! name = "Location"
//! attributes = ["name"]
//! description = "Represents a geographical area such as a city, country, or region"
//!
//! [[relationships]]
//! source = "Person"
//! label = "LOCATED_IN"
//! target = "Location"
//! ```

use crate::error::ExtractorError;
use graphsmith_domain::{NodeSchema, RelationshipSchema, SchemaRegistry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Node entry of a schema file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Type name
    pub name: String,

    /// Allowed attributes
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Relationship entry of a schema file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    /// Source node type
    pub source: String,

    /// Relationship label
    pub label: String,

    /// Target node type
    pub target: String,

    /// Allowed attributes
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Schemas as written in a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Node schemas
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,

    /// Relationship schemas
    #[serde(default)]
    pub relationships: Vec<RelationshipEntry>,
}

impl SchemaFile {
    /// Parse a schema file from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse schema TOML: {}", e)))
    }

    /// Read and parse a schema file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ExtractorError::Config(format!("Failed to read schema file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Validate the schemas and build a registry
    pub fn into_registry(self) -> Result<SchemaRegistry, ExtractorError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|entry| NodeSchema {
                name: entry.name,
                attributes: entry.attributes,
                description: entry.description,
            })
            .collect();

        let relationships = self
            .relationships
            .into_iter()
            .map(|entry| {
                RelationshipSchema::new(entry.source, entry.label, entry.target)
                    .with_attributes(entry.attributes)
            })
            .collect();

        Ok(SchemaRegistry::register(nodes, relationships)?)
    }
}
