use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const REMOTE_SYNC_CATEGORY: &str = "firebase-sync";
pub const DEFAULT_MANUAL_CATEGORY: &str = "manual";
pub const DEFAULT_PROFILE_ID: i64 = 1;

/// Who owns a block rule. Rows in [`RuleCategory::RemoteSync`] are rewritten
/// wholesale on every remote reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    RemoteSync,
    Owner(Arc<str>),
}

impl RuleCategory {
    pub fn manual() -> Self {
        RuleCategory::Owner(Arc::from(DEFAULT_MANUAL_CATEGORY))
    }

    pub fn to_str(&self) -> &str {
        match self {
            RuleCategory::RemoteSync => REMOTE_SYNC_CATEGORY,
            RuleCategory::Owner(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        let s = s.trim();
        if s == REMOTE_SYNC_CATEGORY {
            RuleCategory::RemoteSync
        } else if s.is_empty() {
            RuleCategory::manual()
        } else {
            RuleCategory::Owner(Arc::from(s))
        }
    }

    pub fn is_remote_sync(&self) -> bool {
        matches!(self, RuleCategory::RemoteSync)
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl Serialize for RuleCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_str())
    }
}

impl<'de> Deserialize<'de> for RuleCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RuleCategory::from_str(&s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalRule {
    pub id: Option<i64>,
    pub domain: Arc<str>,
    pub category: RuleCategory,
    pub profile_id: i64,
    pub reason: Option<Arc<str>>,
    pub is_active: bool,
    pub created_at: Option<String>,
}

impl LocalRule {
    pub fn new(domain: Arc<str>, category: RuleCategory, reason: Option<Arc<str>>) -> Self {
        Self {
            id: None,
            domain,
            category,
            profile_id: DEFAULT_PROFILE_ID,
            reason,
            is_active: true,
            created_at: None,
        }
    }

    pub fn remote_sync(domain: Arc<str>) -> Self {
        Self::new(
            domain,
            RuleCategory::RemoteSync,
            Some(Arc::from("Synced from Android app")),
        )
    }

    /// Expects an already normalized domain.
    pub fn validate_domain(domain: &str) -> Result<(), String> {
        if domain.is_empty() {
            return Err("Domain cannot be empty".to_string());
        }
        if domain.len() > 253 {
            return Err("Domain cannot exceed 253 characters".to_string());
        }
        if domain.chars().any(char::is_whitespace) {
            return Err("Domain cannot contain whitespace".to_string());
        }
        Ok(())
    }

    pub fn validate_reason(reason: &Option<Arc<str>>) -> Result<(), String> {
        if let Some(r) = reason {
            if r.len() > 500 {
                return Err("Reason cannot exceed 500 characters".to_string());
            }
        }
        Ok(())
    }
}
