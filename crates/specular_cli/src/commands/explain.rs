//! Explain command - Print every problem found in data.

use anyhow::{Context, Result};
use tracing::info;

use super::input::CheckArgs;
use super::OutputFormat;

pub fn execute(args: CheckArgs) -> Result<()> {
    let (registry, value) = args.load()?;
    info!("Explaining data against :{}", args.spec);

    let explanation = registry
        .explain(args.spec.as_str(), &value)
        .with_context(|| format!("Failed to explain against :{}", args.spec))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&explanation.to_json())?),
        OutputFormat::Text => print!("{}", explanation),
    }
    Ok(())
}
