use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::DomainError;
use crate::normalize::normalize_domain;

pub const ACTIVE_STATUS: &str = "active";

/// A blocked URL as stored remotely by the companion app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteRule {
    pub id: String,
    pub url: String,
    pub added_at: i64,
    pub added_by: String,
    pub status: String,
}

impl RemoteRule {
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }
}

/// Per-poll view of one remote path, keyed by the remote record key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSnapshot {
    rules: BTreeMap<String, RemoteRule>,
}

/// What changed between two snapshots. Only `url` and `status` are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub removed: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

impl RemoteSnapshot {
    pub fn new(rules: BTreeMap<String, RemoteRule>) -> Self {
        Self { rules }
    }

    /// Decodes a remote JSON document of blocked URLs. See
    /// [`decode_keyed_records`] for the accepted shapes.
    pub fn from_value(value: &Value) -> Result<(Self, Vec<String>), DomainError> {
        let (rules, skipped) = decode_keyed_records::<RemoteRule>(value, "url")?;
        Ok((Self { rules }, skipped))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &BTreeMap<String, RemoteRule> {
        &self.rules
    }

    pub fn active_count(&self) -> usize {
        self.rules.values().filter(|r| r.is_active()).count()
    }

    /// Normalized domains of every active record. Records whose URL does not
    /// normalize are dropped.
    pub fn active_domains(&self) -> BTreeSet<String> {
        self.rules
            .values()
            .filter(|r| r.is_active())
            .map(|r| normalize_domain(&r.url))
            .filter(|d| !d.is_empty())
            .collect()
    }

    pub fn diff(&self, previous: &RemoteSnapshot) -> SnapshotDiff {
        let mut diff = SnapshotDiff::default();

        for (key, rule) in &self.rules {
            match previous.rules.get(key) {
                None => diff.added.push(key.clone()),
                Some(old) if old.url != rule.url || old.status != rule.status => {
                    diff.changed.push(key.clone())
                }
                Some(_) => {}
            }
        }

        for key in previous.rules.keys() {
            if !self.rules.contains_key(key) {
                diff.removed.push(key.clone());
            }
        }

        diff
    }

    pub fn differs(&self, previous: &RemoteSnapshot) -> bool {
        !self.diff(previous).is_empty()
    }
}

/// Decodes a remote collection into records keyed by their remote key.
///
/// Objects are keyed by their own keys, arrays by `<array_prefix>_<index>`.
/// Null entries are skipped silently; entries that do not decode are skipped
/// and their keys returned so the caller can report them.
pub fn decode_keyed_records<T: DeserializeOwned>(
    value: &Value,
    array_prefix: &str,
) -> Result<(BTreeMap<String, T>, Vec<String>), DomainError> {
    let entries: Vec<(String, &Value)> = match value {
        Value::Null => Vec::new(),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("{}_{}", array_prefix, i), v))
            .collect(),
        other => {
            return Err(DomainError::RemoteDecode(format!(
                "expected an object or array of records, got {}",
                json_kind(other)
            )))
        }
    };

    let mut records = BTreeMap::new();
    let mut skipped = Vec::new();
    for (key, entry) in entries {
        if entry.is_null() {
            continue;
        }
        match T::deserialize(entry) {
            Ok(record) => {
                records.insert(key, record);
            }
            Err(_) => skipped.push(key),
        }
    }

    Ok((records, skipped))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
