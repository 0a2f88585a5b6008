#![allow(dead_code)]

mod mock_repositories;

pub use mock_repositories::*;

use kidsafe_application::services::{EventBus, HostsBlocker, HostsBlockerConfig};
use std::path::PathBuf;
use std::sync::Arc;

pub fn hosts_blocker(file: Arc<MockHostsFile>) -> Arc<HostsBlocker> {
    Arc::new(HostsBlocker::new(
        HostsBlockerConfig {
            hosts_path: PathBuf::from("/etc/hosts"),
            redirect_ip: "127.0.0.1".to_string(),
        },
        file.clone(),
        file,
        Arc::new(MockResolutionProbe),
        EventBus::default(),
    ))
}
