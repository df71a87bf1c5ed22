use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_DATA_PATH};
use crate::error::{DashboardError, Result};
use crate::pipeline::LocationTable;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub path: PathBuf,
    /// Replaces the built-in location table when set
    pub locations_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            locations_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: u64,
    /// Normally taken from `OPENAI_API_KEY`
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_seconds: 60,
            api_key: None,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path` (must exist) or from the default location (may be
    /// absent), then apply environment overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::read(Path::new(DEFAULT_CONFIG_PATH))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Environment overrides: `ALUMNI_DATA_PATH`, `PORT`, `OPENAI_API_KEY`,
    /// `OPENAI_BASE_URL`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ALUMNI_DATA_PATH") {
            self.data.path = PathBuf::from(path);
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| DashboardError::Config(format!("Invalid PORT value '{}'", port)))?;
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.assistant.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.assistant.endpoint = url;
        }
        Ok(())
    }

    /// The configured location table, or the built-in one.
    pub fn location_table(&self) -> Result<LocationTable> {
        match &self.data.locations_path {
            Some(path) => LocationTable::load(path),
            None => Ok(LocationTable::builtin().clone()),
        }
    }
}
