//! Gateway configuration
//!
//! Read from the TOML file named by `CAS_GATEWAY_CONFIG` when set, otherwise
//! entirely from the environment. Environment variables always win over file
//! values.

use anyhow::{Context, Result};
use cas_auth::CasConfig;
use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_bind_address")]
    pub bind_address: String,

    #[serde(default)]
    pub json_logs: bool,

    pub cas: CasConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match env::var("CAS_GATEWAY_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self {
                bind_address: Self::default_bind_address(),
                json_logs: false,
                cas: CasConfig::from_env().context("CAS settings missing from environment")?,
            },
        };

        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid gateway configuration")?;
        config.cas.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = env::var("CAS_GATEWAY_BIND_ADDR") {
            self.bind_address = addr;
        }
        if let Ok(value) = env::var("CAS_GATEWAY_JSON_LOGS") {
            self.json_logs = matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        self.cas.apply_env()?;
        self.cas.validate()?;
        Ok(())
    }

    fn default_bind_address() -> String {
        "127.0.0.1:8080".to_string()
    }
}
