//! CLI command definitions.
//!
//! Each subcommand loads a registry (catalog domains plus an optional
//! definition file) and runs one engine operation against input data.

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

pub mod catalog;
pub mod conform;
pub mod explain;
pub mod input;
pub mod list;
pub mod validate;

/// specular - validate, conform and explain data against named specs
#[derive(Parser)]
#[command(name = "specular")]
#[command(version, about = "specular - validate, conform and explain data against named specs")]
#[command(long_about = r#"
specular checks JSON or YAML data against composable, named specs.

COMMANDS:
  catalog   → List the built-in spec domains
  list      → List registered specs and their forms
  validate  → Check data against a spec
  conform   → Print the conformed (destructured) form of data
  explain   → Print every problem found in data

Strings beginning with ':' are read as keywords, and object keys are
always keywords.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in catalog domains
    Catalog(catalog::CatalogArgs),

    /// List registered specs
    List(list::ListArgs),

    /// Validate data against a spec
    Validate(input::CheckArgs),

    /// Conform data to a spec
    Conform(input::CheckArgs),

    /// Explain why data does not conform to a spec
    Explain(input::CheckArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Data did not conform; mapped to the validation-failure exit code.
#[derive(Error, Debug)]
#[error("Validation failed against :{spec} ({problems} problems)")]
pub struct ValidationFailed {
    pub spec: String,
    pub problems: usize,
}
