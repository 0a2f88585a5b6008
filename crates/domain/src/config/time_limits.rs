use serde::{Deserialize, Serialize};

/// Screen-time enforcement driven by the remote time rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeLimitsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    #[serde(default = "default_usage_file")]
    pub usage_file: String,

    /// Days of usage history kept in the usage file.
    #[serde(default = "default_history_days")]
    pub history_days: i64,
}

impl Default for TimeLimitsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: default_check_interval_secs(),
            usage_file: default_usage_file(),
            history_days: default_history_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_check_interval_secs() -> u64 {
    30
}

fn default_usage_file() -> String {
    "./data/time_usage.json".to_string()
}

fn default_history_days() -> i64 {
    30
}
