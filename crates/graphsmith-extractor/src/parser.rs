//! Parse backend output into node and relationship candidates

use crate::error::ExtractorError;
use crate::types::{CandidateSet, NodeCandidate, RelationshipCandidate};
use graphsmith_domain::Attributes;
use serde_json::{Map, Value};

/// Parse a backend response into candidates
///
/// The response must be a JSON object with optional `nodes` and
/// `relationships` arrays. Anything structurally wrong fails the whole
/// response; schema checks happen later.
pub(crate) fn parse_backend_response(response: &str) -> Result<CandidateSet, ExtractorError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| parse_error(format!("JSON parse error: {}", e)))?;

    let root = json
        .as_object()
        .ok_or_else(|| parse_error("Expected a JSON object with 'nodes' and 'relationships'"))?;

    let mut candidates = CandidateSet::default();

    for (idx, node_json) in array_field(root, "nodes")?.iter().enumerate() {
        let node = parse_node_json(node_json)
            .map_err(|e| parse_error(format!("node {}: {}", idx, e)))?;
        candidates.nodes.push(node);
    }

    for (idx, rel_json) in array_field(root, "relationships")?.iter().enumerate() {
        let rel = parse_relationship_json(rel_json)
            .map_err(|e| parse_error(format!("relationship {}: {}", idx, e)))?;
        candidates.relationships.push(rel);
    }

    Ok(candidates)
}

fn parse_error(message: impl Into<String>) -> ExtractorError {
    ExtractorError::ExtractionParse(message.into())
}

/// Extract JSON from response, handling markdown code blocks and
/// surrounding prose
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(parse_error("Empty response"));
    }

    // Fenced block: skip the opening ``` line and cut at the closing fence
    if let Some(fenced) = trimmed.strip_prefix("```") {
        let body = fenced
            .split_once('\n')
            .map(|(_, rest)| rest)
            .ok_or_else(|| parse_error("Empty code block"))?;
        let body = body.rfind("```").map_or(body, |end| &body[..end]);
        return Ok(body.trim());
    }

    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    // Prose around the object
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Ok(trimmed),
    }
}

fn array_field<'a>(root: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], ExtractorError> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(parse_error(format!("'{}' must be an array", key))),
    }
}

/// Parse a single node from JSON
fn parse_node_json(json: &Value) -> Result<NodeCandidate, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Node is not a JSON object".to_string())?;

    Ok(NodeCandidate {
        id: required_str(obj, &["id", "name"])?,
        node_type: required_str(obj, &["type", "label"])?,
        attributes: parse_attributes(obj)?,
    })
}

/// Parse a single relationship from JSON
fn parse_relationship_json(json: &Value) -> Result<RelationshipCandidate, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Relationship is not a JSON object".to_string())?;

    Ok(RelationshipCandidate {
        source_id: required_str(obj, &["source_id", "source"])?,
        source_type: required_str(obj, &["source_type"])?,
        label: required_str(obj, &["type", "label"])?,
        target_id: required_str(obj, &["target_id", "target"])?,
        target_type: required_str(obj, &["target_type"])?,
        attributes: parse_attributes(obj)?,
    })
}

/// First of `keys` holding a non-empty string
fn required_str(obj: &Map<String, Value>, keys: &[&str]) -> Result<String, String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| format!("Missing or invalid '{}'", keys[0]))
}

/// Read `attributes` (or `properties`) as a string map
///
/// Scalars are kept as their JSON text, nulls are skipped, nested values are
/// stored as compact JSON.
fn parse_attributes(obj: &Map<String, Value>) -> Result<Attributes, String> {
    let raw = match obj.get("attributes").or_else(|| obj.get("properties")) {
        None | Some(Value::Null) => return Ok(Attributes::new()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err("'attributes' must be an object".to_string()),
    };

    let mut attributes = Attributes::new();
    for (key, value) in raw {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            nested => nested.to_string(),
        };
        attributes.insert(key.trim().to_string(), value);
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{
            "nodes": [
                {"id": "MARIE CURIE", "type": "Person", "attributes": {"birth_year": 1867, "profession": "physicist"}}
            ],
            "relationships": [
                {"source_id": "MARIE CURIE", "source_type": "Person", "type": "SPOUSE_OF",
                 "target_id": "PIERRE CURIE", "target_type": "Person"}
            ]
        }"#;

        let parsed = parse_backend_response(response).unwrap();
        assert_eq!(parsed.nodes.len(), 1);
        assert_eq!(parsed.nodes[0].id, "MARIE CURIE");
        assert_eq!(parsed.nodes[0].attributes.get("birth_year").map(String::as_str), Some("1867"));
        assert_eq!(parsed.relationships.len(), 1);
        assert_eq!(parsed.relationships[0].label, "SPOUSE_OF");
        assert_eq!(parsed.relationships[0].target_id, "PIERRE CURIE");
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"nodes\": [{\"id\": \"PARIS\", \"type\": \"Location\"}]}\n```";
        let parsed = parse_backend_response(response).unwrap();
        assert_eq!(parsed.nodes.len(), 1);
        assert!(parsed.relationships.is_empty());
    }

    #[test]
    fn test_parse_json_surrounded_by_prose() {
        let response = "Here is the graph:\n{\"nodes\": [], \"relationships\": []}\nLet me know!";
        let parsed = parse_backend_response(response).unwrap();
        assert_eq!(parsed, CandidateSet::default());
    }

    #[test]
    fn test_parse_aliases() {
        let response = r#"{
            "nodes": [{"name": "NOBEL PRIZE", "label": "Award", "properties": {"field": "physics"}}],
            "relationships": [{"source": "MARIE CURIE", "source_type": "Person", "label": "awarded",
                               "target": "NOBEL PRIZE", "target_type": "Award", "properties": {"year": "1903"}}]
        }"#;
        let parsed = parse_backend_response(response).unwrap();
        assert_eq!(parsed.nodes[0].node_type, "Award");
        assert_eq!(parsed.relationships[0].label, "awarded");
        assert_eq!(
            parsed.relationships[0].attributes.get("year").map(String::as_str),
            Some("1903")
        );
    }

    #[test]
    fn test_empty_alias_falls_through_to_next() {
        let response = r#"{"nodes": [{"id": "", "name": "MARIE CURIE", "type": "Person"}]}"#;
        let parsed = parse_backend_response(response).unwrap();
        assert_eq!(parsed.nodes[0].id, "MARIE CURIE");
        assert_eq!(parsed.nodes[0].node_type, "Person");
    }

    #[test]
    fn test_missing_arrays_are_empty() {
        let parsed = parse_backend_response("{}").unwrap();
        assert!(parsed.nodes.is_empty());
        assert!(parsed.relationships.is_empty());
    }

    #[test]
    fn test_attribute_value_conversion() {
        let response = r#"{"nodes": [{"id": "X", "type": "T", "attributes":
            {"a": null, "b": true, "c": [1, 2], "d": "  padded  "}}]}"#;
        let attrs = &parse_backend_response(response).unwrap().nodes[0].attributes;
        assert!(!attrs.contains_key("a"));
        assert_eq!(attrs["b"], "true");
        assert_eq!(attrs["c"], "[1,2]");
        assert_eq!(attrs["d"], "padded");
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_backend_response("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::ExtractionParse(_))));
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(matches!(parse_backend_response("  \n"), Err(ExtractorError::ExtractionParse(_))));
    }

    #[test]
    fn test_parse_json_not_object() {
        let result = parse_backend_response(r#"[{"id": "X"}]"#);
        assert!(matches!(result, Err(ExtractorError::ExtractionParse(_))));
    }

    #[test]
    fn test_nodes_not_array() {
        let result = parse_backend_response(r#"{"nodes": {"id": "X"}}"#);
        assert!(matches!(result, Err(ExtractorError::ExtractionParse(_))));
    }

    #[test]
    fn test_node_missing_field_fails_whole_response() {
        let response = r#"{"nodes": [
            {"id": "MARIE CURIE", "type": "Person"},
            {"id": "PIERRE CURIE"}
        ]}"#;
        match parse_backend_response(response) {
            Err(ExtractorError::ExtractionParse(msg)) => {
                assert!(msg.contains("node 1"), "unexpected message: {}", msg);
                assert!(msg.contains("type"));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_relationship_missing_endpoint_type() {
        let response = r#"{"relationships": [
            {"source_id": "A", "type": "SPOUSE_OF", "target_id": "B", "target_type": "Person"}
        ]}"#;
        assert!(matches!(
            parse_backend_response(response),
            Err(ExtractorError::ExtractionParse(_))
        ));
    }

    #[test]
    fn test_attributes_not_object() {
        let response = r#"{"nodes": [{"id": "X", "type": "T", "attributes": ["a"]}]}"#;
        assert!(parse_backend_response(response).is_err());
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }
}
