#![allow(dead_code)]
use kidsafe_domain::{RemoteRule, RemoteSnapshot};
use std::collections::BTreeMap;

pub struct RemoteRuleBuilder {
    id: String,
    url: String,
    added_by: String,
    status: String,
    added_at: i64,
}

impl RemoteRuleBuilder {
    pub fn new(url: &str) -> Self {
        Self {
            id: String::new(),
            url: url.to_string(),
            added_by: "parent".to_string(),
            status: "active".to_string(),
            added_at: 1_700_000_000_000,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn added_at(mut self, added_at: i64) -> Self {
        self.added_at = added_at;
        self
    }

    pub fn build(self) -> RemoteRule {
        RemoteRule {
            id: self.id,
            url: self.url,
            added_at: self.added_at,
            added_by: self.added_by,
            status: self.status,
        }
    }
}

/// Snapshot from `(key, url, status)` triples.
pub fn snapshot(entries: &[(&str, &str, &str)]) -> RemoteSnapshot {
    let rules: BTreeMap<String, RemoteRule> = entries
        .iter()
        .map(|(key, url, status)| {
            (
                key.to_string(),
                RemoteRuleBuilder::new(url).id(key).status(status).build(),
            )
        })
        .collect();
    RemoteSnapshot::new(rules)
}
