//! CAS client configuration

use crate::error::{CasError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Realm advertised in the Basic Authentication challenge
pub const DEFAULT_REALM: &str = "CAS Protected Area";

/// CAS client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasConfig {
    /// Base URL of the CAS server, e.g. `https://cas.example.com/cas`
    pub cas_url: Url,

    /// Service URL tickets are issued for
    pub service_url: Url,

    /// Deadline applied to every HTTP call
    #[serde(default = "CasConfig::default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// User agent sent to the CAS server
    #[serde(default = "CasConfig::default_user_agent")]
    pub user_agent: String,

    /// Realm of the `WWW-Authenticate` challenge
    #[serde(default = "CasConfig::default_realm")]
    pub realm: String,
}

impl CasConfig {
    /// Create a configuration with default timeout, user agent and realm
    pub fn new(cas_url: Url, service_url: Url) -> Self {
        Self {
            cas_url,
            service_url,
            timeout: Self::default_timeout(),
            user_agent: Self::default_user_agent(),
            realm: Self::default_realm(),
        }
    }

    /// Load configuration from a TOML file
    ///
    /// `CAS_*` environment variables that are set override the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_file(path.as_ref(), env_lookup)
    }

    fn load_file(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CasError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: CasConfig = toml::from_str(&content)?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CasConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `CAS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let cas_url = required_url("CAS_URL")?;
        let service_url = required_url("CAS_SERVICE_URL")?;

        let mut config = Self::new(cas_url, service_url);
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `CAS_*` environment variables that are set
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(env_lookup)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("CAS_URL") {
            self.cas_url = parse_url("CAS_URL", &value)?;
        }
        if let Some(value) = lookup("CAS_SERVICE_URL") {
            self.service_url = parse_url("CAS_SERVICE_URL", &value)?;
        }
        if let Some(value) = lookup("CAS_TIMEOUT") {
            self.timeout = humantime_serde::re::humantime::parse_duration(&value)
                .map_err(|e| CasError::Config(format!("Invalid CAS_TIMEOUT: {}", e)))?;
        }
        if let Some(value) = lookup("CAS_USER_AGENT") {
            self.user_agent = value;
        }
        if let Some(value) = lookup("CAS_REALM") {
            self.realm = value;
        }
        Ok(())
    }

    /// Check that both URLs can carry paths and queries
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("cas_url", &self.cas_url), ("service_url", &self.service_url)] {
            if url.cannot_be_a_base() {
                return Err(CasError::Config(format!("{} must be a hierarchical URL: {}", name, url)));
            }
        }
        if self.timeout.is_zero() {
            return Err(CasError::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Build the HTTP client shared by all CAS requests
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| CasError::Config(format!("Failed to build HTTP client: {}", e)))
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(30)
    }

    fn default_user_agent() -> String {
        format!("cas-auth/{}", env!("CARGO_PKG_VERSION"))
    }

    fn default_realm() -> String {
        DEFAULT_REALM.to_string()
    }
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn required_url(var: &str) -> Result<Url> {
    let value = std::env::var(var).map_err(|_| CasError::Config(format!("{} must be set", var)))?;
    parse_url(var, &value)
}

fn parse_url(var: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| CasError::Config(format!("Invalid {}: {}", var, e)))
}
