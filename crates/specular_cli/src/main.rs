//! specular CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure

use std::process::ExitCode;

use clap::Parser;
use specular_catalog::CatalogError;
use specular_spec::SpecError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands, ValidationFailed};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "specular=debug"
    } else if cli.quiet {
        "specular=warn"
    } else {
        "specular=info"
    };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = level.parse() {
        filter = filter.add_directive(directive);
    }
    if let Ok(directive) = "warn".parse() {
        filter = filter.add_directive(directive);
    }
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Conform(args) => commands::conform::execute(args),
        Commands::Explain(args) => commands::explain::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<ValidationFailed>().is_some() {
        return ExitCodes::VALIDATION_FAILURE;
    }
    if let Some(CatalogError::UnknownDomain(_)) = e.downcast_ref::<CatalogError>() {
        return ExitCodes::INVALID_ARGS;
    }
    match e.downcast_ref::<SpecError>() {
        Some(SpecError::UnregisteredSpec(_))
        | Some(SpecError::DocumentNotFound(_))
        | Some(SpecError::Definition { .. }) => return ExitCodes::INVALID_ARGS,
        Some(_) => return ExitCodes::GENERAL_ERROR,
        None => {}
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_validation_failure() {
        let err = anyhow::Error::new(ValidationFailed {
            spec: "person/person".to_string(),
            problems: 2,
        });
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_categorize_unknown_spec() {
        let err = anyhow::Error::new(SpecError::UnregisteredSpec("nope".to_string()))
            .context("Failed to validate");
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_unknown_domain() {
        let err = anyhow::Error::new(CatalogError::UnknownDomain("poker".to_string()));
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_other() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }
}
