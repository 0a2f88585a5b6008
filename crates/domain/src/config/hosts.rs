use serde::{Deserialize, Serialize};

use crate::hosts_section::DEFAULT_REDIRECT_IP;

/// What happens to the hosts file when the agent stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownMode {
    /// Remove only the managed section and delete the backup.
    #[default]
    Strip,
    /// Write the startup snapshot (or backup file) back in full.
    Restore,
}

impl ShutdownMode {
    pub fn to_str(&self) -> &'static str {
        match self {
            ShutdownMode::Strip => "strip",
            ShutdownMode::Restore => "restore",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostsConfig {
    #[serde(default = "default_hosts_path")]
    pub path: String,

    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,

    #[serde(default = "default_redirect_ip")]
    pub redirect_ip: String,

    /// Upper bound for a single write strategy, elevation prompts included.
    #[serde(default = "default_strategy_timeout_secs")]
    pub strategy_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub flush_dns: bool,

    #[serde(default)]
    pub shutdown_mode: ShutdownMode,
}

impl HostsConfig {
    pub fn backup_path(&self) -> String {
        format!("{}{}", self.path, self.backup_suffix)
    }
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            path: default_hosts_path(),
            backup_suffix: default_backup_suffix(),
            redirect_ip: default_redirect_ip(),
            strategy_timeout_secs: default_strategy_timeout_secs(),
            flush_dns: true,
            shutdown_mode: ShutdownMode::default(),
        }
    }
}

pub fn default_hosts_path() -> String {
    if cfg!(windows) {
        r"C:\Windows\System32\drivers\etc\hosts".to_string()
    } else {
        "/etc/hosts".to_string()
    }
}

fn default_backup_suffix() -> String {
    ".kidSafe_backup".to_string()
}

fn default_redirect_ip() -> String {
    DEFAULT_REDIRECT_IP.to_string()
}

fn default_strategy_timeout_secs() -> u64 {
    15
}

fn default_true() -> bool {
    true
}
