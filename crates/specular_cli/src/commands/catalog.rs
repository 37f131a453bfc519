//! Catalog command - List the built-in spec domains.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use specular_catalog::Domain;

use super::OutputFormat;

#[derive(Args)]
pub struct CatalogArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct DomainEntry {
    id: &'static str,
    description: &'static str,
    specs: &'static [&'static str],
    fn_specs: &'static [&'static str],
}

fn entries() -> Vec<DomainEntry> {
    Domain::ALL
        .iter()
        .map(|d| DomainEntry {
            id: d.id(),
            description: d.description(),
            specs: d.specs(),
            fn_specs: d.fn_specs(),
        })
        .collect()
}

pub fn execute(args: CatalogArgs) -> Result<()> {
    let entries = entries();
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            for entry in &entries {
                println!("{:<12} {}", entry.id, entry.description);
                for name in entry.specs {
                    println!("    :{}", name);
                }
                for name in entry.fn_specs {
                    println!("    :{} (fn)", name);
                }
            }
        }
    }
    Ok(())
}
