use async_trait::async_trait;
use kidsafe_application::ports::HostsFileStore;
use kidsafe_domain::DomainError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// The hosts file and its `.kidSafe_backup` sibling on the local disk.
pub struct SystemHostsFile {
    path: PathBuf,
    backup_path: PathBuf,
}

impl SystemHostsFile {
    pub fn new(path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: backup_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}

/// Hosts files are not guaranteed to be valid UTF-8.
pub(crate) async fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait]
impl HostsFileStore for SystemHostsFile {
    async fn read(&self) -> Result<String, DomainError> {
        read_lossy(&self.path)
            .await
            .map_err(|e| DomainError::HostsFileUnreadable(format!("{}: {}", self.path.display(), e)))
    }

    async fn read_backup(&self) -> Result<Option<String>, DomainError> {
        match read_lossy(&self.backup_path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_backup(&self, content: &str) -> Result<(), DomainError> {
        fs::write(&self.backup_path, content).await?;
        debug!(path = %self.backup_path.display(), "Hosts backup written");
        Ok(())
    }

    async fn remove_backup(&self) -> Result<(), DomainError> {
        match fs::remove_file(&self.backup_path).await {
            Ok(()) => {
                debug!(path = %self.backup_path.display(), "Hosts backup removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
