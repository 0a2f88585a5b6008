use chrono::Utc;
use kidsafe_domain::DomainError;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::ports::RemoteStore;
use crate::services::HostsBlocker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PcStatus {
    pub last_seen: i64,
    pub status: String,
    pub version: String,
    pub host_file_status: String,
    pub blocked_count: usize,
}

/// Publishes the agent heartbeat read by the companion app.
pub struct ReportPcStatusUseCase {
    remote: Arc<dyn RemoteStore>,
    hosts: Arc<HostsBlocker>,
    path: String,
    version: String,
}

impl ReportPcStatusUseCase {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        hosts: Arc<HostsBlocker>,
        path: String,
        version: String,
    ) -> Self {
        Self {
            remote,
            hosts,
            path,
            version,
        }
    }

    pub async fn execute(&self) -> Result<PcStatus, DomainError> {
        let blocked_count = self.hosts.blocked_count().await;
        let status = PcStatus {
            last_seen: Utc::now().timestamp_millis(),
            status: "connected".to_string(),
            version: self.version.clone(),
            host_file_status: if blocked_count > 0 { "active" } else { "inactive" }.to_string(),
            blocked_count,
        };

        let value = serde_json::to_value(&status)
            .map_err(|e| DomainError::RemoteDecode(e.to_string()))?;
        self.remote.set(&self.path, &value).await?;

        debug!(path = %self.path, blocked_count, "PC status reported");
        Ok(status)
    }
}
