// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::client::auth::TASKS_SCOPE;
use anyhow::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_scope() -> String {
    TASKS_SCOPE.to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    /// Path to the installed-app client-secret JSON file.
    pub credentials: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Where the token blob is persisted between sessions, if anywhere.
    #[serde(default)]
    pub token_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: String::new(),
            scope: default_scope(),
            token_file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "tasq")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load the configuration from the default location.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(&Config::default_path()?)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        // Explicitly detect missing file so callers (onboarding) can behave accordingly.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Helper to detect whether an anyhow::Error indicates that the config
    /// file was missing, even when wrapped.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;
        Ok(())
    }
}
