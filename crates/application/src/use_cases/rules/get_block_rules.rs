use kidsafe_domain::{DomainError, LocalRule, RuleCategory};
use std::sync::Arc;

use crate::ports::RuleRepository;

pub struct GetBlockRulesUseCase {
    repo: Arc<dyn RuleRepository>,
}

impl GetBlockRulesUseCase {
    pub fn new(repo: Arc<dyn RuleRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> Result<Vec<LocalRule>, DomainError> {
        self.repo.get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<LocalRule, DomainError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(DomainError::RuleNotFound(id))
    }

    pub async fn get_by_category(
        &self,
        category: &RuleCategory,
    ) -> Result<Vec<LocalRule>, DomainError> {
        self.repo.get_by_category(category).await
    }
}
