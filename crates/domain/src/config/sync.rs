use serde::{Deserialize, Serialize};

/// Placeholder replaced by each derived identity in path templates.
pub const UID_PLACEHOLDER: &str = "{uid}";

/// How a remote user identifier is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    /// The configured family/account UID.
    Account,
    /// `user_` + 16 hex chars of the MD5 of the account email, as older
    /// mobile clients stored it.
    LegacyEmailHash,
}

impl IdentityStrategy {
    pub fn to_str(&self) -> &'static str {
        match self {
            IdentityStrategy::Account => "account",
            IdentityStrategy::LegacyEmailHash => "legacy-email-hash",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the realtime database, e.g. `https://<project>.firebaseio.com`.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default)]
    pub family_id: Option<String>,

    #[serde(default)]
    pub user_email: Option<String>,

    #[serde(default = "default_blocked_url_paths")]
    pub blocked_url_paths: Vec<String>,

    #[serde(default = "default_time_rule_paths")]
    pub time_rule_paths: Vec<String>,

    #[serde(default = "default_status_path")]
    pub status_path: String,

    #[serde(default = "default_identities")]
    pub identities: Vec<IdentityStrategy>,

    #[serde(default = "default_base_interval_ms")]
    pub base_interval_ms: u64,

    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,

    #[serde(default = "default_time_rules_base_interval_ms")]
    pub time_rules_base_interval_ms: u64,

    #[serde(default = "default_time_rules_backoff_factor")]
    pub time_rules_backoff_factor: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database_url: None,
            auth_token: None,
            family_id: None,
            user_email: None,
            blocked_url_paths: default_blocked_url_paths(),
            time_rule_paths: default_time_rule_paths(),
            status_path: default_status_path(),
            identities: default_identities(),
            base_interval_ms: default_base_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            backoff_factor: default_backoff_factor(),
            request_timeout_secs: default_request_timeout_secs(),
            status_interval_secs: default_status_interval_secs(),
            time_rules_base_interval_ms: default_time_rules_base_interval_ms(),
            time_rules_backoff_factor: default_time_rules_backoff_factor(),
        }
    }
}

fn default_blocked_url_paths() -> Vec<String> {
    vec![
        "kidsafe/families/{uid}/blockedUrls".to_string(),
        "kidsafe/blockedUrls".to_string(),
        "kidsafe/blockedUrls_{uid}".to_string(),
        "families/{uid}/blockedUrls".to_string(),
        "users/{uid}/blockedUrls".to_string(),
        "blockedUrls".to_string(),
    ]
}

fn default_time_rule_paths() -> Vec<String> {
    vec![
        "{uid}/syncStatus/timeRules".to_string(),
        "kidsafe/families/{uid}/timeRules".to_string(),
        "families/{uid}/timeRules".to_string(),
        "users/{uid}/timeRules".to_string(),
    ]
}

fn default_status_path() -> String {
    "kidsafe/families/{uid}/pcStatus".to_string()
}

fn default_identities() -> Vec<IdentityStrategy> {
    vec![IdentityStrategy::Account, IdentityStrategy::LegacyEmailHash]
}

fn default_base_interval_ms() -> u64 {
    2_000
}

fn default_max_interval_ms() -> u64 {
    30_000
}

fn default_backoff_factor() -> f64 {
    1.2
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_status_interval_secs() -> u64 {
    30
}

fn default_time_rules_base_interval_ms() -> u64 {
    3_000
}

fn default_time_rules_backoff_factor() -> f64 {
    1.5
}
