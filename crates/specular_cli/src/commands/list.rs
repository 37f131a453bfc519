//! List command - List registered specs and their forms.

use anyhow::Result;
use clap::Args;

use specular_spec::Registry;

use super::input::SourceArgs;
use super::OutputFormat;

#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    source: SourceArgs,
}

/// `(name, form)` for every registered spec, sorted by name.
fn forms(registry: &Registry) -> Vec<(String, String)> {
    registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let form = registry.get(&name)?.describe();
            Some((name, form))
        })
        .collect()
}

pub fn execute(args: ListArgs) -> Result<()> {
    let registry = args.source.load_registry()?;
    let forms = forms(&registry);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "specs": forms
                    .iter()
                    .map(|(name, form)| serde_json::json!({"name": name, "form": form}))
                    .collect::<Vec<_>>(),
                "fn_specs": registry.fn_names(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            for (name, form) in &forms {
                println!(":{}  {}", name, form);
            }
            for name in registry.fn_names() {
                println!(":{}  (fspec)", name);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specular_catalog::Domain;

    #[test]
    fn test_forms_describe_specs() {
        let registry = Registry::new();
        Domain::Recipe.install(&registry).unwrap();
        let forms = forms(&registry);
        let ingredient = forms
            .iter()
            .find(|(name, _)| name == "recipe/ingredient")
            .map(|(_, form)| form.as_str());
        assert_eq!(ingredient, Some("(cat :quantity number? :unit keyword?)"));
    }
}
