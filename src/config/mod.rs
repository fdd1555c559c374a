use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub timezone: String,
    pub timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    config_file: PathBuf,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("", "", "weather-cli")
            .context("Failed to get project directories")?;

        let config_file = proj_dirs.config_dir().join("config.toml");

        Ok(AppConfig { config_file })
    }

    pub fn from_path(config_file: PathBuf) -> Self {
        AppConfig { config_file }
    }

    /// Settings from the config file, or defaults when there is none.
    pub fn load(&self) -> Result<Settings> {
        if !self.config_file.exists() {
            debug!(path = %self.config_file.display(), "no config file, using defaults");
            return Ok(Settings::default());
        }

        let contents =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let settings: Settings =
            toml::from_str(&contents).context("Failed to parse config file")?;

        debug!(path = %self.config_file.display(), ?settings, "loaded config");
        Ok(settings)
    }

    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_file
    }
}
