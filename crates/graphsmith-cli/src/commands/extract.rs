//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use graphsmith_domain::{Document, GraphDocument, TextCompletionBackend};
use graphsmith_extractor::{ExtractorConfig, ExtractorError, GraphExtractor, SchemaFile};
use std::fs;
use std::io::{self, Read};
use tracing::debug;

/// Per-document results of an extract run.
#[derive(Debug)]
pub struct ExtractOutcome {
    /// Graphs extracted, in input order
    pub graphs: Vec<GraphDocument>,

    /// Inputs that failed, with the reason
    pub failures: Vec<(String, ExtractorError)>,
}

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    debug!(backend = ?config.backend, "Building backend");
    let backend = config.backend.build()?;

    let mut outcome = run_extract(&args, backend, config.extractor.clone()).await?;
    let total = outcome.graphs.len() + outcome.failures.len();

    // A lone document's error is reported as-is
    if total == 1 {
        if let Some((_, err)) = outcome.failures.pop() {
            return Err(err.into());
        }
    }

    if !outcome.graphs.is_empty() {
        println!("{}", formatter.format_graphs(&outcome.graphs)?);
    }

    for (source, err) in &outcome.failures {
        eprintln!("{}", formatter.error(&format!("{}: {}", source, err)));
    }

    match outcome.failures.len() {
        0 => Ok(()),
        failed => Err(CliError::PartialFailure { failed, total }),
    }
}

/// Load inputs, extract with `backend`, and collect the results.
pub async fn run_extract<B>(
    args: &ExtractArgs,
    backend: B,
    extractor_config: ExtractorConfig,
) -> Result<ExtractOutcome>
where
    B: TextCompletionBackend + 'static,
{
    let registry = SchemaFile::load(&args.schema)?.into_registry()?;
    let documents = read_documents(args)?;

    let mut extractor = GraphExtractor::new(backend, registry, extractor_config)?;
    if let Some(instructions) = read_instructions(args)? {
        extractor = extractor.with_instructions(instructions);
    }

    let sources: Vec<String> = documents
        .iter()
        .map(|doc| doc.metadata().get("source").cloned().unwrap_or_default())
        .collect();

    let results = extractor.extract_batch(documents).await;

    let mut outcome = ExtractOutcome {
        graphs: Vec::new(),
        failures: Vec::new(),
    };
    for (source, result) in sources.into_iter().zip(results) {
        match result {
            Ok(graph) => outcome.graphs.push(graph),
            Err(e) => {
                debug!(source = %source, error = %e, "Extraction failed");
                outcome.failures.push((source, e));
            }
        }
    }

    Ok(outcome)
}

fn read_documents(args: &ExtractArgs) -> Result<Vec<Document>> {
    if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(vec![Document::new(buffer).with_metadata("source", "<stdin>")]);
    }

    if args.input.is_empty() {
        return Err(CliError::InvalidInput(
            "Must specify either --input or --stdin".to_string(),
        ));
    }

    args.input
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path)?;
            Ok(Document::new(text).with_metadata("source", path.display().to_string()))
        })
        .collect()
}

fn read_instructions(args: &ExtractArgs) -> Result<Option<String>> {
    match (&args.instructions, &args.instructions_file) {
        (Some(text), _) => Ok(Some(text.clone())),
        (None, Some(path)) => Ok(Some(fs::read_to_string(path)?)),
        (None, None) => Ok(None),
    }
}
