//! Command implementations.

pub mod extract;
pub mod schema;

pub use self::extract::{execute_extract, run_extract, ExtractOutcome};
pub use self::schema::{execute_schema, run_schema};
