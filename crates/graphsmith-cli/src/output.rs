//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use graphsmith_domain::{Attributes, GraphDocument, SchemaRegistry};
use graphsmith_extractor::schema_json;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format extracted graphs.
    ///
    /// JSON output is a single object for one graph and an array otherwise.
    pub fn format_graphs(&self, graphs: &[GraphDocument]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = match graphs {
                    [graph] => graph_json(graph),
                    _ => Value::Array(graphs.iter().map(graph_json).collect()),
                };
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => Ok(graphs
                .iter()
                .map(|graph| self.format_graph_table(graph))
                .collect::<Vec<_>>()
                .join("\n\n")),
        }
    }

    /// Format a registry.
    pub fn format_schema(&self, registry: &SchemaRegistry) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&schema_json(registry))?),
            OutputFormat::Table => Ok(self.format_schema_table(registry)),
        }
    }

    fn format_graph_table(&self, graph: &GraphDocument) -> String {
        let mut out = String::new();

        if let Some(source) = graph.source().metadata().get("source") {
            out.push_str(&self.colorize(&format!("Document: {}", source), "cyan"));
            out.push('\n');
        }

        if graph.is_empty() {
            out.push_str(&self.colorize("No nodes or relationships extracted.", "yellow"));
            return out;
        }

        let mut nodes = Builder::default();
        nodes.push_record(["ID", "Type", "Attributes"]);
        for node in graph.nodes() {
            nodes.push_record([
                node.id.clone(),
                node.node_type.clone(),
                format_attributes(&node.attributes),
            ]);
        }
        out.push_str(&styled(nodes.build()));
        out.push('\n');

        if graph.relationship_count() > 0 {
            let mut relationships = Builder::default();
            relationships.push_record(["Source", "Relationship", "Target", "Attributes"]);
            for rel in graph.relationships() {
                relationships.push_record([
                    format!("{} ({})", rel.source.id, rel.source.node_type),
                    rel.label.clone(),
                    format!("{} ({})", rel.target.id, rel.target.node_type),
                    format_attributes(&rel.attributes),
                ]);
            }
            out.push_str(&styled(relationships.build()));
            out.push('\n');
        }

        let stats = graph.stats();
        let mut summary = format!(
            "{} node(s), {} relationship(s)",
            graph.node_count(),
            graph.relationship_count()
        );
        if stats.nodes_dropped + stats.relationships_dropped > 0 {
            summary.push_str(&format!(
                "; dropped {} node(s) and {} relationship(s) outside the schema",
                stats.nodes_dropped, stats.relationships_dropped
            ));
        }
        out.push_str(&self.success(&summary));
        out
    }

    fn format_schema_table(&self, registry: &SchemaRegistry) -> String {
        let mut nodes = Builder::default();
        nodes.push_record(["Node Type", "Attributes", "Description"]);
        for node in registry.node_schemas() {
            nodes.push_record([
                node.name.clone(),
                node.attributes.join(", "),
                node.description.clone().unwrap_or_default(),
            ]);
        }

        let mut relationships = Builder::default();
        relationships.push_record(["Source", "Relationship", "Target", "Attributes"]);
        for rel in registry.relationship_schemas() {
            relationships.push_record([
                rel.source_type.clone(),
                rel.label.clone(),
                rel.target_type.clone(),
                rel.attributes.join(", "),
            ]);
        }

        format!(
            "{}\n{}\n{}",
            styled(nodes.build()),
            styled(relationships.build()),
            self.success("Schema is valid")
        )
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn format_attributes(attributes: &Attributes) -> String {
    attributes
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serializable view of a graph document.
pub fn graph_json(graph: &GraphDocument) -> Value {
    let source = graph.source();
    let stats = graph.stats();

    json!({
        "document": {
            "id": source.id().to_string(),
            "metadata": source.metadata(),
        },
        "nodes": graph.nodes().map(|node| json!({
            "id": node.id,
            "type": node.node_type,
            "attributes": node.attributes,
        })).collect::<Vec<_>>(),
        "relationships": graph.relationships().map(|rel| json!({
            "source": {"id": rel.source.id, "type": rel.source.node_type},
            "type": rel.label,
            "target": {"id": rel.target.id, "type": rel.target.node_type},
            "attributes": rel.attributes,
        })).collect::<Vec<_>>(),
        "stats": {
            "chunks": stats.chunks,
            "backend_attempts": stats.backend_attempts,
            "nodes_dropped": stats.nodes_dropped,
            "relationships_dropped": stats.relationships_dropped,
            "model": stats.model_name,
            "elapsed_ms": stats.elapsed_ms,
        },
    })
}
