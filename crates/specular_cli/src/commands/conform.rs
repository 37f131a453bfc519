//! Conform command - Print the conformed form of data.

use anyhow::{Context, Result};
use tracing::info;

use specular_spec::Conformance;

use super::input::CheckArgs;
use super::{OutputFormat, ValidationFailed};

pub fn execute(args: CheckArgs) -> Result<()> {
    let (registry, value) = args.load()?;
    info!("Conforming data to :{}", args.spec);

    let conformance = registry
        .conform(args.spec.as_str(), &value)
        .with_context(|| format!("Failed to conform to :{}", args.spec))?;

    match conformance {
        Conformance::Conformed(conformed) => {
            match args.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&conformed.to_json())?)
                }
                OutputFormat::Text => println!("{}", conformed),
            }
            Ok(())
        }
        Conformance::Invalid => {
            let explanation = registry.explain(args.spec.as_str(), &value)?;
            eprint!("{}", explanation);
            Err(ValidationFailed {
                spec: args.spec,
                problems: explanation.len(),
            }
            .into())
        }
    }
}
