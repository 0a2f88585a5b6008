use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::database::DatabaseConfig;
use super::errors::ConfigError;
use super::hosts::HostsConfig;
use super::logging::LoggingConfig;
use super::sync::SyncConfig;
use super::time_limits::TimeLimitsConfig;

const LOCAL_CONFIG_PATH: &str = "kidsafe.toml";

#[cfg(windows)]
const SYSTEM_CONFIG_PATH: &str = r"C:\ProgramData\KidSafe\config.toml";
#[cfg(not(windows))]
const SYSTEM_CONFIG_PATH: &str = "/etc/kidsafe/config.toml";

/// Main configuration structure for the KidSafe agent
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Hosts file location and write behaviour
    #[serde(default)]
    pub hosts: HostsConfig,

    /// Remote block-list and time-rule synchronisation
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub time_limits: TimeLimitsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. kidsafe.toml in current directory
    /// 3. System-wide config path
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(db) = overrides.database_path {
            self.database.path = db;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(hosts) = overrides.hosts_path {
            self.hosts.path = hosts;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hosts.path cannot be empty".to_string(),
            ));
        }

        if self.hosts.redirect_ip.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "hosts.redirect_ip '{}' is not an IP address",
                self.hosts.redirect_ip
            )));
        }

        if self.hosts.strategy_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "hosts.strategy_timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.validate_sync()?;

        if self.time_limits.enabled && self.time_limits.check_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "time_limits.check_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_sync(&self) -> Result<(), ConfigError> {
        let sync = &self.sync;

        if sync.base_interval_ms == 0
            || sync.time_rules_base_interval_ms == 0
            || sync.status_interval_secs == 0
            || sync.request_timeout_secs == 0
        {
            return Err(ConfigError::Validation(
                "sync intervals and timeouts must be greater than 0".to_string(),
            ));
        }

        if sync.max_interval_ms < sync.base_interval_ms
            || sync.max_interval_ms < sync.time_rules_base_interval_ms
        {
            return Err(ConfigError::Validation(format!(
                "sync.max_interval_ms ({}) cannot be lower than the base intervals",
                sync.max_interval_ms
            )));
        }

        if [sync.backoff_factor, sync.time_rules_backoff_factor]
            .iter()
            .any(|f| f.is_nan() || *f < 1.0)
        {
            return Err(ConfigError::Validation(
                "sync backoff factors must be at least 1.0".to_string(),
            ));
        }

        if !sync.enabled {
            return Ok(());
        }

        if sync.database_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "sync.database_url is required when sync is enabled".to_string(),
            ));
        }

        if sync.family_id.as_deref().map_or(true, |f| f.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "sync.family_id is required when sync is enabled".to_string(),
            ));
        }

        if sync.blocked_url_paths.is_empty() {
            return Err(ConfigError::Validation(
                "sync.blocked_url_paths cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub database_path: Option<String>,
    pub log_level: Option<String>,
    pub hosts_path: Option<String>,
}
