#![allow(dead_code)]
#![allow(unused_imports)]

mod mock_repositories;

pub use mock_repositories::*;

use kidsafe_application::services::{EventBus, HostsBlocker, HostsBlockerConfig};
use kidsafe_domain::DEFAULT_REDIRECT_IP;
use std::path::PathBuf;
use std::sync::Arc;

pub const HOSTS_PATH: &str = "/tmp/kidsafe-test-hosts";
pub const SYSTEM_HOSTS: &str = "127.0.0.1 localhost\n::1 localhost\n";

pub fn hosts_blocker(file: Arc<MockHostsFile>, events: EventBus) -> Arc<HostsBlocker> {
    hosts_blocker_with_probe(file, Arc::new(MockResolutionProbe::new()), events)
}

pub fn hosts_blocker_with_probe(
    file: Arc<MockHostsFile>,
    probe: Arc<MockResolutionProbe>,
    events: EventBus,
) -> Arc<HostsBlocker> {
    Arc::new(HostsBlocker::new(
        HostsBlockerConfig {
            hosts_path: PathBuf::from(HOSTS_PATH),
            redirect_ip: DEFAULT_REDIRECT_IP.to_string(),
        },
        file.clone(),
        file,
        probe,
        events,
    ))
}

/// Hostnames of the managed section of `content`, sorted.
pub fn managed_hostnames(content: &str) -> Vec<String> {
    let mut names: Vec<String> = kidsafe_domain::parse_managed_section(content)
        .into_iter()
        .map(|e| e.hostname)
        .collect();
    names.sort();
    names
}

/// Remote blocklist document in the keyed-object shape, from
/// `(key, url, status)` triples.
pub fn blocklist(entries: &[(&str, &str, &str)]) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(key, url, status)| {
            (
                key.to_string(),
                serde_json::json!({
                    "id": key,
                    "url": url,
                    "status": status,
                    "addedAt": 1_700_000_000_000i64,
                    "addedBy": "parent",
                }),
            )
        })
        .collect();
    serde_json::Value::Object(map)
}
