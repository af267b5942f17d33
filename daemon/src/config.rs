//! Daemon configuration, loaded from TOML.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vulcan_mail::MailTemplates;
use vulcan_service::ServiceConfig;
use vulcan_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid service config: {0}")]
    Service(String),
}

/// Top-level daemon configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub blockchain: BlockchainConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    /// Email domains written to the fraud denylist at startup.
    #[serde(default)]
    pub fraud_domains: Vec<String>,

    /// Age in days after which an installed referral is reported as stale.
    #[serde(default = "default_stale_referral_days")]
    pub stale_referral_days: u64,

    /// How often the stale referral report runs; 0 disables it.
    #[serde(default = "default_stale_report_interval_secs")]
    pub stale_report_interval_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockchainConfig {
    /// Base URL of the transfer broadcaster.
    #[serde(default = "default_blockchain_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_denom")]
    pub denom: String,

    #[serde(default = "default_blockchain_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MailConfig {
    /// Base URL of the mail delivery API.
    #[serde(default = "default_mail_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub templates: MailTemplates,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./vulcan_data")
}

fn default_map_size() -> usize {
    vulcan_store_lmdb::environment::DEFAULT_MAP_SIZE
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7080))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_stale_referral_days() -> u64 {
    30
}

fn default_stale_report_interval_secs() -> u64 {
    86_400
}

fn default_blockchain_endpoint() -> String {
    "http://127.0.0.1:1317".to_string()
}

fn default_denom() -> String {
    vulcan_blockchain::DEFAULT_DENOM.to_string()
}

fn default_blockchain_timeout_secs() -> u64 {
    30
}

fn default_mail_endpoint() -> String {
    "http://127.0.0.1:8025/api/send".to_string()
}

fn default_queue_capacity() -> usize {
    vulcan_mail::DEFAULT_QUEUE_CAPACITY
}

impl DaemonConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config
            .service
            .validate()
            .map_err(|e| ConfigError::Service(e.to_string()))?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            listen_addr: default_listen_addr(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            blockchain: BlockchainConfig::default(),
            mail: MailConfig::default(),
            service: ServiceConfig::default(),
            fraud_domains: Vec::new(),
            stale_referral_days: default_stale_referral_days(),
            stale_report_interval_secs: default_stale_report_interval_secs(),
        }
    }
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            endpoint: default_blockchain_endpoint(),
            denom: default_denom(),
            timeout_secs: default_blockchain_timeout_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            endpoint: default_mail_endpoint(),
            api_key: String::new(),
            queue_capacity: default_queue_capacity(),
            templates: MailTemplates::default(),
        }
    }
}
