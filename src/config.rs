use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub agent_service: AgentServiceConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentServiceConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub patients_dir: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context("Failed to read config file. Make sure config.toml exists.")?;

        let mut config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        // Override with environment variable if set
        if let Ok(key) = std::env::var("AGENT_SERVICE_API_KEY") {
            config.agent_service.api_key = key;
        }

        Ok(config)
    }

    /// Make sure the patient data directory is there before any tool reads from it.
    pub fn check_data_dir(&self) -> Result<()> {
        let dir = Path::new(&self.data.patients_dir);
        if !dir.is_dir() {
            anyhow::bail!(
                "Patient data directory does not exist: {}",
                dir.display()
            );
        }
        Ok(())
    }
}
