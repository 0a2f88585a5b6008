use async_trait::async_trait;
use kidsafe_domain::DomainError;
use std::path::Path;
use std::time::Duration;

/// Persists hosts file content, escalating privileges as needed.
#[async_trait]
pub trait HostsWriter: Send + Sync {
    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError>;
}

/// One way of getting content into a protected file.
#[async_trait]
pub trait WriteStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Longest one attempt can take when every step carries its own timeout.
    /// `None` leaves the writer's per-strategy timeout in charge.
    fn time_budget(&self) -> Option<Duration> {
        None
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError>;
}
