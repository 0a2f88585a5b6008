use async_trait::async_trait;
use kidsafe_application::ports::ResolutionProbe;
use kidsafe_domain::DomainError;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::lookup_host;

/// Resolves through the system resolver, so hosts file entries win.
pub struct SystemResolutionProbe {
    timeout: Duration,
}

impl SystemResolutionProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemResolutionProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl ResolutionProbe for SystemResolutionProbe {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, DomainError> {
        let lookup = tokio::time::timeout(self.timeout, lookup_host((domain, 80)))
            .await
            .map_err(|_| DomainError::IoError(format!("Lookup of {} timed out", domain)))?
            .map_err(|e| DomainError::IoError(format!("Lookup of {} failed: {}", domain, e)))?;

        let mut addrs: Vec<IpAddr> = Vec::new();
        for addr in lookup {
            if !addrs.contains(&addr.ip()) {
                addrs.push(addr.ip());
            }
        }
        Ok(addrs)
    }
}
