//! Configuration loading
//!
//! Settings come from, in increasing priority: built-in defaults, the TOML
//! file, environment variables (a `.env` file is loaded by `main`), and
//! command-line flags applied by the command handler.

pub mod settings;

pub use settings::{
    AccountConfig, BatchConfig, ColumnConfig, FailurePolicy, NodeConfig, RetrySettings,
    ServerConfig, SnmpV3Config,
};
#[cfg(test)]
pub use settings::{SnmpAuthMethod, SnmpPrivMethod};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables recognised as overrides
pub mod env_vars {
    pub const SERVER: &str = "ORION_SERVER";
    pub const USERNAME: &str = "ORION_USERNAME";
    pub const PASSWORD: &str = "ORION_PASSWORD";
    pub const SNMP_USERNAME: &str = "ORION_SNMP_USERNAME";
    pub const SNMP_AUTH_KEY: &str = "ORION_SNMP_AUTH_KEY";
    pub const SNMP_PRIV_KEY: &str = "ORION_SNMP_PRIV_KEY";
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub account: AccountConfig,
    pub node: NodeConfig,
    pub snmp: SnmpV3Config,
    pub columns: ColumnConfig,
    pub batch: BatchConfig,
    pub retry: RetrySettings,
}

impl Config {
    /// Default location: `<config dir>/orion-provision/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("orion-provision").join("config.toml"))
    }

    /// Load configuration from an explicit path, or from the default
    /// location when it exists, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => {
                    log::debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(env_vars::SERVER) {
            self.server.host = host;
        }
        if let Some(username) = get(env_vars::USERNAME) {
            self.account.username = Some(username);
        }
        if let Some(username) = get(env_vars::SNMP_USERNAME) {
            self.snmp.username = username;
        }
        if let Some(key) = get(env_vars::SNMP_AUTH_KEY) {
            self.snmp.auth_key = key;
        }
        if let Some(key) = get(env_vars::SNMP_PRIV_KEY) {
            self.snmp.priv_key = key;
        }
    }

    /// Check the settings needed for a run. SNMP credentials are only
    /// required when nodes will really be created.
    pub fn validate(&self, dry_run: bool) -> Result<()> {
        if self.server.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }

        let excluded = self.columns.excluded();
        if excluded.iter().any(|c| c.trim().is_empty()) {
            bail!("column names in [columns] must not be empty");
        }
        let unique: HashSet<&str> = excluded.iter().copied().collect();
        if unique.len() != excluded.len() {
            bail!("column names in [columns] must be distinct");
        }

        if !dry_run {
            let missing: Vec<&str> = [
                ("snmp.username", &self.snmp.username),
                ("snmp.auth_key", &self.snmp.auth_key),
                ("snmp.priv_key", &self.snmp.priv_key),
            ]
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

            if !missing.is_empty() {
                bail!(
                    "SNMPv3 credentials are not configured: {} (set them in the config file or via {}, {}, {})",
                    missing.join(", "),
                    env_vars::SNMP_USERNAME,
                    env_vars::SNMP_AUTH_KEY,
                    env_vars::SNMP_PRIV_KEY
                );
            }
        }

        Ok(())
    }
}
