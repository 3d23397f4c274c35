//! CLI configuration

use std::path::PathBuf;

use forge_engine::{ExecutionMode, ForgeOptions};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "FORGE_CONFIG";

/// Path of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("forge")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema file used when a command is given none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
    pub engine: ForgeOptions,
}

impl Config {
    /// Load the config file, falling back to defaults when it is missing or
    /// unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Wrote config to {}", path.display());
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "schema",
            "engine.default_mode",
            "engine.max_concurrency",
            "engine.max_range_span",
            "engine.auto_index",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "schema" => self.schema.as_ref().map(|p| p.display().to_string()),
            "engine.default_mode" => Some(self.engine.default_mode.to_string()),
            "engine.max_concurrency" => Some(self.engine.max_concurrency.to_string()),
            "engine.max_range_span" => Some(self.engine.max_range_span.to_string()),
            "engine.auto_index" => Some(self.engine.auto_index.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "schema" => self.schema = Some(PathBuf::from(value)),
            "engine.default_mode" => {
                self.engine.default_mode = value
                    .parse::<ExecutionMode>()
                    .map_err(anyhow::Error::msg)?;
            }
            "engine.max_concurrency" => {
                self.engine = self.engine.clone().with_max_concurrency(value.parse()?);
            }
            "engine.max_range_span" => self.engine.max_range_span = value.parse()?,
            "engine.auto_index" => self.engine.auto_index = value.parse()?,
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}
