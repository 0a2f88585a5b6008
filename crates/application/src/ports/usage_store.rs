use async_trait::async_trait;
use kidsafe_domain::{DomainError, UsageLedger};

#[async_trait]
pub trait UsageStore: Send + Sync {
    /// An absent store yields an empty ledger.
    async fn load(&self) -> Result<UsageLedger, DomainError>;

    async fn save(&self, ledger: &UsageLedger) -> Result<(), DomainError>;
}
