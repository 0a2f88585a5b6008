use async_trait::async_trait;
use kidsafe_domain::DomainError;
use serde_json::Value;

/// Path-addressed JSON document store shared with the companion app.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `Ok(None)` when nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<Value>, DomainError>;

    async fn set(&self, path: &str, value: &Value) -> Result<(), DomainError>;
}
