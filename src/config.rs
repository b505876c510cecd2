use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::character_gen::GenerationConfig;
use crate::core::rules::{self, RuleSet};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub generation: GenerationConfig,
}

/// Where rule tables and character records live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding rpgData.json, statsData.json and namesData.json.
    /// The bundled tables are used when unset.
    pub rules_dir: Option<PathBuf>,
    /// Default directory for saved characters.
    pub save_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from `~/.config/rpg-builder/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}; using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No config file at {}; using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load the configured rule tables, or the bundled ones.
    pub fn rules(&self) -> rules::Result<RuleSet> {
        match &self.data.rules_dir {
            Some(dir) => RuleSet::load(dir),
            None => RuleSet::bundled(),
        }
    }

    /// Resolved save directory (override or the current directory).
    pub fn save_dir(&self) -> PathBuf {
        self.data
            .save_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("rpg-builder").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
