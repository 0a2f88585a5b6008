use async_trait::async_trait;
use kidsafe_domain::DomainError;

/// Cuts or restores outbound web access for the whole machine.
#[async_trait]
pub trait NetworkGate: Send + Sync {
    async fn block(&self) -> Result<(), DomainError>;

    async fn unblock(&self) -> Result<(), DomainError>;
}
