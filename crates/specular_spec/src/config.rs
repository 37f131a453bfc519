//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SpecError, SpecResult};

/// Environment variable that toggles [`EngineConfig::check_asserts`].
pub const CHECK_ASSERTS_ENV: &str = "SPECULAR_CHECK_ASSERTS";

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether `assert` checks values or passes them through.
    pub check_asserts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_asserts: true,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(CHECK_ASSERTS_ENV) {
            config.check_asserts = parse_flag(&raw).unwrap_or(config.check_asserts);
        }
        config
    }

    /// Load from a YAML or JSON file (by extension).
    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.exists() {
            return Err(SpecError::DocumentNotFound(path.to_path_buf()));
        }
        debug!("Loading engine config from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let config = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
