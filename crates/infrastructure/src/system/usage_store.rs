use async_trait::async_trait;
use kidsafe_application::ports::UsageStore;
use kidsafe_domain::{DomainError, UsageLedger};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Usage ledger kept as pretty-printed JSON next to the database.
pub struct JsonUsageStore {
    path: PathBuf,
}

impl JsonUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UsageStore for JsonUsageStore {
    async fn load(&self) -> Result<UsageLedger, DomainError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No usage file yet");
                return Ok(UsageLedger::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            DomainError::IoError(format!(
                "Invalid usage file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn save(&self, ledger: &UsageLedger) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(ledger)
            .map_err(|e| DomainError::IoError(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), days = ledger.days.len(), "Usage saved");
        Ok(())
    }
}
