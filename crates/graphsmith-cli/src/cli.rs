//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Graphsmith CLI - Extract schema-constrained knowledge graphs from text.
#[derive(Debug, Parser)]
#[command(name = "graphsmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (defaults to ~/.graphsmith/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a graph from one or more documents
    Extract(ExtractArgs),

    /// Validate a schema file and print it as the model sees it
    Schema(SchemaArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// TOML file declaring node and relationship schemas
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Document files to extract from
    #[arg(short, long, conflicts_with = "stdin")]
    pub input: Vec<PathBuf>,

    /// Read a single document from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Additional instructions for the model
    #[arg(long, conflicts_with = "instructions_file")]
    pub instructions: Option<String>,

    /// Read additional instructions from a file
    #[arg(long)]
    pub instructions_file: Option<PathBuf>,
}

/// Arguments for the schema command.
#[derive(Debug, Parser)]
pub struct SchemaArgs {
    /// TOML file declaring node and relationship schemas
    #[arg(short, long)]
    pub schema: PathBuf,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
