use async_trait::async_trait;
use kidsafe_domain::{DomainError, LocalRule, RuleCategory};
use std::collections::BTreeSet;

#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Fails with `DomainError::InvalidRule` when the (domain, category)
    /// pair already exists.
    async fn insert(&self, rule: &LocalRule) -> Result<LocalRule, DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<LocalRule>, DomainError>;

    /// Newest first.
    async fn get_all(&self) -> Result<Vec<LocalRule>, DomainError>;

    async fn get_by_category(&self, category: &RuleCategory) -> Result<Vec<LocalRule>, DomainError>;

    /// Inserts an active row for the pair, or marks the existing one active.
    async fn upsert_active(&self, domain: &str, category: &RuleCategory) -> Result<(), DomainError>;

    async fn delete(&self, id: i64) -> Result<(), DomainError>;

    /// Deletes rows of `category` whose domain is not in `keep`; returns the
    /// number of rows removed.
    async fn delete_by_category_except(
        &self,
        category: &RuleCategory,
        keep: &BTreeSet<String>,
    ) -> Result<u64, DomainError>;

    /// Distinct domains of every active row, all categories.
    async fn get_active_domains(&self) -> Result<Vec<String>, DomainError>;
}
