use kidsafe_domain::{DomainError, LocalRule};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::ports::RuleRepository;
use crate::services::{AgentEvent, EventBus, HostsBlocker};

pub struct DeleteBlockRuleUseCase {
    repo: Arc<dyn RuleRepository>,
    hosts: Arc<HostsBlocker>,
    events: EventBus,
}

impl DeleteBlockRuleUseCase {
    pub fn new(repo: Arc<dyn RuleRepository>, hosts: Arc<HostsBlocker>, events: EventBus) -> Self {
        Self {
            repo,
            hosts,
            events,
        }
    }

    /// Deletes the row. The domain leaves the hosts file only when no other
    /// active rule still names it.
    #[instrument(skip(self))]
    pub async fn execute(&self, id: i64) -> Result<LocalRule, DomainError> {
        let rule = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(DomainError::RuleNotFound(id))?;

        self.repo.delete(id).await?;

        info!(
            rule_id = id,
            domain = %rule.domain,
            category = %rule.category,
            "Block rule deleted"
        );
        self.events.emit(AgentEvent::RulesChanged {
            source: rule.category.to_string(),
        });

        let still_active = self
            .repo
            .get_active_domains()
            .await?
            .iter()
            .any(|d| d.as_str() == rule.domain.as_ref());

        if !still_active {
            self.hosts.remove_domain(&rule.domain).await?;
        }

        Ok(rule)
    }
}
