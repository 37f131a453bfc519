//! Shared arguments: where specs come from and where data comes from.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use specular_catalog::{install_domains, Domain};
use specular_spec::{EngineConfig, Registry, SpecDocument, Value};

use super::OutputFormat;

#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Spec definition file (YAML, or JSON by extension)
    #[arg(long)]
    pub defs: Option<PathBuf>,

    /// Catalog domain to load (repeatable; default: all domains)
    #[arg(long)]
    pub catalog: Vec<String>,
}

impl SourceArgs {
    /// Build a registry from the selected catalog domains and definition file.
    pub fn load_registry(&self) -> Result<Registry> {
        let registry = Registry::with_config(EngineConfig::from_env());

        let domains = if self.catalog.is_empty() {
            Domain::ALL.to_vec()
        } else {
            self.catalog
                .iter()
                .map(|id| id.parse::<Domain>())
                .collect::<Result<Vec<_>, _>>()?
        };
        install_domains(&registry, &domains)?;

        if let Some(path) = &self.defs {
            let document = SpecDocument::load(path)
                .with_context(|| format!("Failed to read spec definitions from {:?}", path))?;
            let names = document.install(&registry)?;
            debug!("Loaded {} definitions from {:?}", names.len(), path);
        }
        Ok(registry)
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Name of the spec to check against
    #[arg(short, long)]
    pub spec: String,

    /// Data file (YAML, or JSON by extension)
    #[arg(short, long, conflicts_with = "value", required_unless_present = "value")]
    pub data: Option<PathBuf>,

    /// Inline data as JSON or YAML text
    #[arg(long)]
    pub value: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub source: SourceArgs,
}

impl CheckArgs {
    /// The registry and the data value to check.
    pub fn load(&self) -> Result<(Registry, Value)> {
        let registry = self.source.load_registry()?;
        let value = match (&self.data, &self.value) {
            (Some(path), _) => parse_file(path)?,
            (None, Some(text)) => parse_text(text)?,
            (None, None) => anyhow::bail!("Missing argument: --data or --value"),
        };
        Ok((registry, value))
    }
}

/// Parse JSON text, falling back to YAML.
pub fn parse_text(text: &str) -> Result<Value> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Ok(Value::from_json(json)),
        Err(_) => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).context("Data is neither JSON nor YAML")?;
            Ok(Value::from_yaml(yaml))
        }
    }
}

/// Read a data file, choosing the parser by extension.
pub fn parse_file(path: &Path) -> Result<Value> {
    debug!("Reading data from {:?}", path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Data file not found or unreadable: {:?}", path))?;
    if path.extension().is_some_and(|e| e == "json") {
        let json: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {:?}", path))?;
        Ok(Value::from_json(json))
    } else {
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {:?}", path))?;
        Ok(Value::from_yaml(yaml))
    }
}
