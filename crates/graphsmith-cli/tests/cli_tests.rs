//! Command tests driven by a mock backend and temporary files

use graphsmith_cli::cli::{ExtractArgs, SchemaArgs};
use graphsmith_cli::commands::{run_extract, run_schema};
use graphsmith_cli::config::{Config, OutputFormat};
use graphsmith_cli::{CliError, Formatter};
use graphsmith_domain::BackendError;
use graphsmith_extractor::{ExtractorConfig, ExtractorError};
use graphsmith_llm::MockBackend;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SCHEMA: &str = r#"
[[nodes]]
name = "Person"
attributes = ["name", "birth_year"]

[[nodes]]
name = "Organization"
attributes = ["name"]
description = "Represents a group, company, or institution"

[[relationships]]
source = "Person"
label = "SPOUSE_OF"
target = "Person"

[[relationships]]
source = "Person"
label = "MEMBER_OF"
target = "Organization"
attributes = ["start_year"]
"#;

const RESPONSE: &str = r#"{
  "nodes": [
    {"id": "MARIE CURIE", "type": "Person", "attributes": {"birth_year": "1867"}},
    {"id": "PIERRE CURIE", "type": "Person"}
  ],
  "relationships": [
    {"source_id": "MARIE CURIE", "source_type": "Person", "type": "SPOUSE_OF",
     "target_id": "PIERRE CURIE", "target_type": "Person"}
  ]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn extract_args(schema: PathBuf, input: Vec<PathBuf>) -> ExtractArgs {
    ExtractArgs {
        schema,
        input,
        stdin: false,
        instructions: None,
        instructions_file: None,
    }
}

fn fast_config() -> ExtractorConfig {
    ExtractorConfig {
        initial_backoff_ms: 1,
        max_backoff_ms: 2,
        ..ExtractorConfig::default()
    }
}

#[tokio::test]
async fn test_extract_single_file() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "schema.toml", SCHEMA);
    let input = write(&dir, "curie.txt", "Marie Curie married Pierre Curie in 1895.");

    let outcome = run_extract(
        &extract_args(schema, vec![input.clone()]),
        MockBackend::new(RESPONSE),
        fast_config(),
    )
    .await
    .unwrap();

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.graphs.len(), 1);

    let graph = &outcome.graphs[0];
    assert!(graph.node("MARIE CURIE", "Person").is_some());
    assert_eq!(graph.relationships_labeled("SPOUSE_OF").count(), 1);
    assert_eq!(
        graph.source().metadata().get("source").map(String::as_str),
        Some(input.display().to_string().as_str())
    );
}

#[tokio::test]
async fn test_extract_reads_instructions_file() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "schema.toml", SCHEMA);
    let input = write(&dir, "curie.txt", "Marie Curie married Pierre Curie.");
    let instructions = write(
        &dir,
        "instructions.txt",
        "- all names must be extracted as uppercase\n",
    );

    let mut args = extract_args(schema, vec![input]);
    args.instructions_file = Some(instructions);

    let backend = MockBackend::new(RESPONSE);
    run_extract(&args, backend.clone(), fast_config()).await.unwrap();

    assert!(backend.prompts()[0].contains("all names must be extracted as uppercase"));
}

#[tokio::test]
async fn test_extract_batch_keeps_order_and_failures() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "schema.toml", SCHEMA);
    let first = write(&dir, "a.txt", "Marie Curie married Pierre Curie.");
    let second = write(&dir, "b.txt", "This one makes the model fail.");
    let third = write(&dir, "c.txt", "Pierre Curie married Marie Curie.");

    let backend = MockBackend::new(RESPONSE);
    backend.add_error(
        "makes the model fail",
        BackendError::Rejected("400 Bad Request".to_string()),
    );

    let outcome = run_extract(
        &extract_args(schema, vec![first, second.clone(), third]),
        backend,
        fast_config(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.graphs.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].0, second.display().to_string());
    assert!(matches!(outcome.failures[0].1, ExtractorError::Backend(BackendError::Rejected(_))));
    assert!(outcome.graphs[0].source().metadata()["source"].ends_with("a.txt"));
    assert!(outcome.graphs[1].source().metadata()["source"].ends_with("c.txt"));
}

#[tokio::test]
async fn test_extract_requires_input() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "schema.toml", SCHEMA);

    let result = run_extract(
        &extract_args(schema, vec![]),
        MockBackend::new(RESPONSE),
        fast_config(),
    )
    .await;
    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[tokio::test]
async fn test_extract_invalid_schema() {
    let dir = TempDir::new().unwrap();
    let schema = write(
        &dir,
        "schema.toml",
        r#"
[[nodes]]
name = "Person"

[[nodes]]
name = "Person"
"#,
    );
    let input = write(&dir, "curie.txt", "Marie Curie");

    let result = run_extract(
        &extract_args(schema, vec![input]),
        MockBackend::new(RESPONSE),
        fast_config(),
    )
    .await;
    assert!(matches!(result, Err(CliError::Extractor(ExtractorError::Schema(_)))));
}

#[tokio::test]
async fn test_extract_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "schema.toml", SCHEMA);

    let result = run_extract(
        &extract_args(schema, vec![dir.path().join("missing.txt")]),
        MockBackend::new(RESPONSE),
        fast_config(),
    )
    .await;
    assert!(matches!(result, Err(CliError::Io(_))));
}

#[test]
fn test_schema_command_json() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "schema.toml", SCHEMA);

    let output =
        run_schema(&SchemaArgs { schema }, &Formatter::new(OutputFormat::Json, false)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["nodes"][0]["type"], "Person");
    assert_eq!(value["nodes"][1]["description"], "Represents a group, company, or institution");
    assert_eq!(value["relationships"][1]["type"], "MEMBER_OF");
    assert_eq!(value["relationships"][1]["attributes"][0], "start_year");
}

#[test]
fn test_schema_command_rejects_undeclared_endpoint() {
    let dir = TempDir::new().unwrap();
    let schema = write(
        &dir,
        "schema.toml",
        r#"
[[nodes]]
name = "Person"

[[relationships]]
source = "Person"
label = "AWARDED"
target = "Award"
"#,
    );

    let result = run_schema(&SchemaArgs { schema }, &Formatter::new(OutputFormat::Table, false));
    assert!(matches!(result, Err(CliError::Extractor(ExtractorError::Schema(_)))));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "config.toml",
        r#"
[backend]
base_url = "http://localhost:11434/v1"
model = "llama3.1"
api_key = "local"

[extractor]
max_retries = 1
"#,
    );

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.backend.model, "llama3.1");
    assert_eq!(config.backend.api_key.as_deref(), Some("local"));
    assert_eq!(config.extractor.max_retries, 1);
}

#[test]
fn test_config_invalid_extractor_settings() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.toml", "[extractor]\nmax_concurrency = 0\n");

    assert!(matches!(Config::load(Some(path.as_path())), Err(CliError::Config(_))));
}

#[test]
fn test_config_explicit_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(Some(dir.path().join("nope.toml").as_path()));
    assert!(matches!(result, Err(CliError::Config(_))));
}
