use kidsafe_domain::{normalize_domain, DomainError, LocalRule, RuleCategory};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::ports::RuleRepository;
use crate::services::{AgentEvent, EventBus, HostsBlocker};

pub struct AddBlockRuleUseCase {
    repo: Arc<dyn RuleRepository>,
    hosts: Arc<HostsBlocker>,
    events: EventBus,
}

impl AddBlockRuleUseCase {
    pub fn new(repo: Arc<dyn RuleRepository>, hosts: Arc<HostsBlocker>, events: EventBus) -> Self {
        Self {
            repo,
            hosts,
            events,
        }
    }

    /// Persists the rule, then blocks the domain right away. When the hosts
    /// write fails the row stays and the error is returned; the next apply
    /// converges the file.
    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        raw_domain: String,
        category: RuleCategory,
        reason: Option<String>,
    ) -> Result<LocalRule, DomainError> {
        let domain = normalize_domain(&raw_domain);
        if domain.is_empty() {
            return Err(DomainError::InvalidDomainName(raw_domain));
        }
        LocalRule::validate_domain(&domain).map_err(DomainError::InvalidDomainName)?;

        if category.is_remote_sync() {
            return Err(DomainError::InvalidRule(format!(
                "Category '{}' is managed by remote sync",
                category
            )));
        }

        let reason = reason.as_deref().map(Arc::from);
        LocalRule::validate_reason(&reason).map_err(DomainError::InvalidRule)?;

        let rule = LocalRule::new(Arc::from(domain.as_str()), category, reason);
        let created = self.repo.insert(&rule).await?;

        info!(
            rule_id = ?created.id,
            domain = %domain,
            category = %created.category,
            "Block rule created"
        );
        self.events.emit(AgentEvent::RulesChanged {
            source: created.category.to_string(),
        });

        self.hosts.add_domain(&domain).await?;

        Ok(created)
    }
}
