//! Schema command implementation.

use crate::cli::SchemaArgs;
use crate::error::Result;
use crate::output::Formatter;
use graphsmith_extractor::SchemaFile;

/// Execute the schema command.
pub fn execute_schema(args: SchemaArgs, formatter: &Formatter) -> Result<()> {
    println!("{}", run_schema(&args, formatter)?);
    Ok(())
}

/// Validate the schema file and render it.
pub fn run_schema(args: &SchemaArgs, formatter: &Formatter) -> Result<String> {
    let registry = SchemaFile::load(&args.schema)?.into_registry()?;
    formatter.format_schema(&registry)
}
