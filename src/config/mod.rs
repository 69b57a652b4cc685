use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::AppError;

/// Environment variables with this prefix override the config file, e.g. `TILEBOARD__DATABASE__URL`
pub const ENV_PREFIX: &str = "TILEBOARD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Seconds between automatic expiry sweeps
    pub interval_seconds: u64,
    pub enabled: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/tileboard.db".to_string(),
            max_connections: Some(5),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from `config_file` layered under `TILEBOARD__*` environment variables.
    ///
    /// A missing file is created with the defaults so operators have something to edit.
    pub fn load(config_file: &str) -> Result<Self> {
        if !Path::new(config_file).exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            if let Some(parent) = Path::new(config_file).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(config_file, contents)?;
        }

        let config: Config = ::config::Config::builder()
            .add_source(::config::File::with_name(config_file).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url must not be empty"));
        }
        if self.sweep.interval_seconds == 0 {
            return Err(AppError::configuration(
                "sweep.interval_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}
