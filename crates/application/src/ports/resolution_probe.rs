use async_trait::async_trait;
use kidsafe_domain::DomainError;
use std::net::IpAddr;

/// Resolves a hostname through the OS resolver, which honours the hosts file.
#[async_trait]
pub trait ResolutionProbe: Send + Sync {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, DomainError>;
}
