//! Validate command - Check data against a spec.

use anyhow::{Context, Result};
use tracing::info;

use super::input::CheckArgs;
use super::{OutputFormat, ValidationFailed};

pub fn execute(args: CheckArgs) -> Result<()> {
    let (registry, value) = args.load()?;
    info!("Validating data against :{}", args.spec);

    let explanation = registry
        .explain(args.spec.as_str(), &value)
        .with_context(|| format!("Failed to validate against :{}", args.spec))?;
    let valid = explanation.is_empty();

    match args.format {
        OutputFormat::Json => {
            let mut json = explanation.to_json();
            json["valid"] = serde_json::Value::Bool(valid);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if valid {
                println!("valid");
            } else {
                print!("{}", explanation);
            }
        }
    }

    if !valid {
        return Err(ValidationFailed {
            spec: args.spec,
            problems: explanation.len(),
        }
        .into());
    }
    Ok(())
}
