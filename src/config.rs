use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    /// Caption languages to prefer when a request names none
    pub languages: Option<Vec<String>>,
}

impl Config {
    /// Load config from ~/.config/ytxd/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Load config from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content =
            std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.clone().unwrap_or_default()
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytxd")
        .join("config.toml")
}
