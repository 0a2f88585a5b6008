use kidsafe_domain::{normalize_domain, DomainError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::ports::RuleRepository;
use crate::services::HostsBlocker;

/// Writes the union of every active rule, all categories, to the hosts file.
pub struct ApplyRulesToHostsUseCase {
    repo: Arc<dyn RuleRepository>,
    hosts: Arc<HostsBlocker>,
}

impl ApplyRulesToHostsUseCase {
    pub fn new(repo: Arc<dyn RuleRepository>, hosts: Arc<HostsBlocker>) -> Self {
        Self { repo, hosts }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<usize, DomainError> {
        let domains: BTreeSet<String> = self
            .repo
            .get_active_domains()
            .await?
            .iter()
            .map(|d| normalize_domain(d))
            .filter(|d| !d.is_empty())
            .collect();

        let count = domains.len();
        self.hosts.replace_all(domains).await?;

        info!(domains = count, "Active rules applied to hosts file");
        Ok(count)
    }
}
