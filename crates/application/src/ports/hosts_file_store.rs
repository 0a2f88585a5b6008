use async_trait::async_trait;
use kidsafe_domain::DomainError;

/// Unprivileged access to the hosts file and its backup copy.
#[async_trait]
pub trait HostsFileStore: Send + Sync {
    /// Fails with `DomainError::HostsFileUnreadable`.
    async fn read(&self) -> Result<String, DomainError>;

    async fn read_backup(&self) -> Result<Option<String>, DomainError>;

    async fn write_backup(&self, content: &str) -> Result<(), DomainError>;

    async fn remove_backup(&self) -> Result<(), DomainError>;
}
