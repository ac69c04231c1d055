use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the question-answering endpoint
    pub endpoint: Option<String>,

    /// UI text
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub subtitle: String,
    pub placeholder: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Engineering Document Assistant".to_string(),
            subtitle: "Ask questions about your engineering documents".to_string(),
            placeholder: "Ask a question about your engineering documents...".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: None,
            ui: UiConfig::default(),
        }
    }
}

/// `~/.doc-assistant`
pub fn app_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".doc-assistant"))
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(app_home()?.join("config.toml"))
}

/// Default location of the log file
pub fn default_log_path() -> Result<PathBuf> {
    Ok(app_home()?.join("logs").join("doc-assistant.log"))
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Endpoint to use, preferring an explicit override (flag or environment)
    /// over the config file
    pub fn resolve_endpoint(&self, override_endpoint: Option<&str>) -> Result<String> {
        override_endpoint
            .map(str::to_string)
            .or_else(|| self.endpoint.clone())
            .filter(|endpoint| !endpoint.trim().is_empty())
            .context(
                "No endpoint configured. Pass --endpoint, set DOC_ASSISTANT_ENDPOINT, \
                 or run `doc-assistant init --endpoint <URL>`",
            )
    }
}
