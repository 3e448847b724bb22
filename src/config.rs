//! Host configuration loaded from `config.toml`.
//!
//! Every section and field is defaulted, so a file only needs to name the
//! values it overrides:
//!
//! ```toml
//! [search]
//! providers = ["tavily", "google", "exa", "brave"]
//! max_results = 8
//!
//! [knowledge]
//! path = "/var/lib/ansimssi/knowledge_base.json"
//! ```
//!
//! API keys never live here; they come from the environment.

use std::path::{Path, PathBuf};

use ansimssi_search::{ProviderEndpoints, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Aggregation policy.
    pub search: SearchConfig,
    /// Learned answer storage.
    pub knowledge: KnowledgeConfig,
    /// Provider API base URLs.
    pub endpoints: ProviderEndpoints,
}

/// Knowledge store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// JSON file holding learned interactions.
    pub path: PathBuf,
    /// Queue live answers for learning.
    pub learn: bool,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: crate::ansimssi_dirs::knowledge_file(),
            learn: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path, e.g. `~/.config/ansimssi/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::ansimssi_dirs::config_file()
    }

    /// Load from `path` if given, else from the default path if that file
    /// exists, else use defaults.
    ///
    /// # Errors
    ///
    /// An explicitly given path must exist and parse.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    tracing::debug!(path = %default_path.display(), "loading config");
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Search`] wrapping the search config error.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        Ok(())
    }
}
