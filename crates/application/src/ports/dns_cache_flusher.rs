use async_trait::async_trait;
use kidsafe_domain::DomainError;

#[async_trait]
pub trait DnsCacheFlusher: Send + Sync {
    async fn flush(&self) -> Result<(), DomainError>;
}
