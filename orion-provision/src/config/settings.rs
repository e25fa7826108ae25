//! Configuration sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::ResilienceConfig;

/// SWIS endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Orion ships with a self-signed certificate, so verification is off by default
    pub verify_tls: bool,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "orion".to_string(),
            port: 17778,
            verify_tls: false,
            timeout_secs: 60,
        }
    }
}

/// Orion account; the password is never read from the file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub username: Option<String>,
}

/// Static properties every new node is created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Polling engine the node is assigned to
    pub engine_id: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { engine_id: 5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SnmpAuthMethod {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl SnmpAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnmpAuthMethod::Md5 => "MD5",
            SnmpAuthMethod::Sha1 => "SHA1",
            SnmpAuthMethod::Sha256 => "SHA256",
            SnmpAuthMethod::Sha384 => "SHA384",
            SnmpAuthMethod::Sha512 => "SHA512",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SnmpPrivMethod {
    Des56,
    Aes128,
    Aes192,
    Aes256,
}

impl SnmpPrivMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnmpPrivMethod::Des56 => "DES56",
            SnmpPrivMethod::Aes128 => "AES128",
            SnmpPrivMethod::Aes192 => "AES192",
            SnmpPrivMethod::Aes256 => "AES256",
        }
    }
}

/// SNMPv3 credential block sent with every node
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpV3Config {
    pub username: String,
    pub auth_key: String,
    pub auth_key_is_password: bool,
    pub auth_method: SnmpAuthMethod,
    pub priv_key: String,
    pub priv_key_is_password: bool,
    pub priv_method: SnmpPrivMethod,
}

impl Default for SnmpV3Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            auth_key: String::new(),
            auth_key_is_password: true,
            auth_method: SnmpAuthMethod::Sha1,
            priv_key: String::new(),
            priv_key_is_password: true,
            priv_method: SnmpPrivMethod::Aes128,
        }
    }
}

impl std::fmt::Debug for SnmpV3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnmpV3Config")
            .field("username", &self.username)
            .field("auth_method", &self.auth_method)
            .field("priv_method", &self.priv_method)
            .finish_non_exhaustive()
    }
}

/// Spreadsheet column names with fixed meaning. Every other column is a custom property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub ip_address: String,
    pub caption: String,
    pub connection_profile: String,
    pub device_template: String,
    pub node_group: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            ip_address: "IP_Address".to_string(),
            caption: "Caption".to_string(),
            connection_profile: "ConnectionProfile".to_string(),
            device_template: "DeviceTemplate".to_string(),
            node_group: "NodeGroup".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Columns never written as custom properties
    pub fn excluded(&self) -> [&str; 5] {
        [
            self.ip_address.as_str(),
            self.caption.as_str(),
            self.node_group.as_str(),
            self.device_template.as_str(),
            self.connection_profile.as_str(),
        ]
    }

    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded().contains(&column)
    }
}

/// What to do with the rest of the batch when a row fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failed row
    #[default]
    Abort,
    /// Record the failure and continue with the next row
    Skip,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Input and batch behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub file: PathBuf,
    pub sheet: String,
    pub on_error: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("add_nodes.xlsx"),
            sheet: "Sheet1".to_string(),
            on_error: FailurePolicy::Abort,
        }
    }
}

/// `[retry]` section, mapped onto ResilienceConfig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
    pub log_bodies: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter: true,
            log_bodies: false,
        }
    }
}

impl RetrySettings {
    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig::builder()
            .max_attempts(self.max_attempts)
            .base_delay(Duration::from_millis(self.base_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .backoff_multiplier(self.backoff_multiplier)
            .jitter(self.jitter)
            .log_bodies(self.log_bodies)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_columns() {
        let columns = ColumnConfig::default();
        let mut excluded = columns.excluded().to_vec();
        excluded.sort();

        assert_eq!(
            excluded,
            vec![
                "Caption",
                "ConnectionProfile",
                "DeviceTemplate",
                "IP_Address",
                "NodeGroup"
            ]
        );
        assert!(columns.is_excluded("IP_Address"));
        assert!(!columns.is_excluded("Site"));
    }

    #[test]
    fn test_snmp_debug_hides_keys() {
        let snmp = SnmpV3Config {
            username: "monitor".to_string(),
            auth_key: "authsecret".to_string(),
            priv_key: "privsecret".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", snmp);

        assert!(rendered.contains("monitor"));
        assert!(!rendered.contains("authsecret"));
        assert!(!rendered.contains("privsecret"));
    }

    #[test]
    fn test_retry_settings_to_resilience() {
        let settings = RetrySettings {
            max_attempts: 3,
            base_delay_ms: 100,
            ..Default::default()
        };
        let resilience = settings.resilience();

        assert_eq!(resilience.retry.max_attempts, 3);
        assert_eq!(resilience.retry.base_delay, Duration::from_millis(100));
        assert_eq!(resilience.retry.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(SnmpAuthMethod::Sha1.as_str(), "SHA1");
        assert_eq!(SnmpPrivMethod::Aes128.as_str(), "AES128");
        assert_eq!(FailurePolicy::Skip.to_string(), "skip");
    }
}
