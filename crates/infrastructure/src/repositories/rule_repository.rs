use async_trait::async_trait;
use kidsafe_application::ports::RuleRepository;
use kidsafe_domain::{DomainError, LocalRule, RuleCategory};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, instrument};

type RuleRow = (i64, String, String, i64, Option<String>, i64, String);

const RULE_COLUMNS: &str = "id, domain, category, profile_id, reason, is_active, created_at";

pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_rule(row: RuleRow) -> LocalRule {
        let (id, domain, category, profile_id, reason, is_active, created_at) = row;
        LocalRule {
            id: Some(id),
            domain: Arc::from(domain.as_str()),
            category: RuleCategory::from_str(&category),
            profile_id,
            reason: reason.map(|s| Arc::from(s.as_str())),
            is_active: is_active != 0,
            created_at: Some(created_at),
        }
    }
}

#[async_trait]
impl RuleRepository for SqliteRuleRepository {
    #[instrument(skip(self))]
    async fn insert(&self, rule: &LocalRule) -> Result<LocalRule, DomainError> {
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let row = sqlx::query_as::<_, RuleRow>(&format!(
            "INSERT INTO block_rules (domain, category, profile_id, reason, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {}",
            RULE_COLUMNS
        ))
        .bind(rule.domain.as_ref())
        .bind(rule.category.to_str())
        .bind(rule.profile_id)
        .bind(rule.reason.as_deref())
        .bind(if rule.is_active { 1i64 } else { 0i64 })
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                DomainError::InvalidRule(format!(
                    "Rule for '{}' in category '{}' already exists",
                    rule.domain, rule.category
                ))
            } else {
                error!(error = %e, "Failed to insert block rule");
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        Ok(Self::row_to_rule(row))
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> Result<Option<LocalRule>, DomainError> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {} FROM block_rules WHERE id = ?",
            RULE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query block rule by id");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(Self::row_to_rule))
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<LocalRule>, DomainError> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {} FROM block_rules ORDER BY created_at DESC, id DESC",
            RULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query block rules");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Self::row_to_rule).collect())
    }

    #[instrument(skip(self))]
    async fn get_by_category(&self, category: &RuleCategory) -> Result<Vec<LocalRule>, DomainError> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {} FROM block_rules WHERE category = ? ORDER BY created_at DESC, id DESC",
            RULE_COLUMNS
        ))
        .bind(category.to_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query block rules by category");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(Self::row_to_rule).collect())
    }

    #[instrument(skip(self))]
    async fn upsert_active(&self, domain: &str, category: &RuleCategory) -> Result<(), DomainError> {
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let reason = if category.is_remote_sync() {
            LocalRule::remote_sync(Arc::from(domain)).reason
        } else {
            None
        };

        sqlx::query(
            "INSERT INTO block_rules (domain, category, reason, is_active, created_at)
             VALUES (?, ?, ?, 1, ?)
             ON CONFLICT(domain, category) DO UPDATE SET is_active = 1",
        )
        .bind(domain)
        .bind(category.to_str())
        .bind(reason.as_deref())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, domain = %domain, "Failed to upsert block rule");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM block_rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to delete block rule");
                DomainError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::RuleNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self, keep), fields(keep = keep.len()))]
    async fn delete_by_category_except(
        &self,
        category: &RuleCategory,
        keep: &BTreeSet<String>,
    ) -> Result<u64, DomainError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM block_rules WHERE category = ");
        builder.push_bind(category.to_str());

        if !keep.is_empty() {
            builder.push(" AND domain NOT IN (");
            let mut separated = builder.separated(", ");
            for domain in keep {
                separated.push_bind(domain.as_str());
            }
            separated.push_unseparated(")");
        }

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            error!(error = %e, "Failed to delete stale block rules");
            DomainError::DatabaseError(e.to_string())
        })?;

        debug!(
            category = %category,
            removed = result.rows_affected(),
            "Stale block rules deleted"
        );
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn get_active_domains(&self) -> Result<Vec<String>, DomainError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT DISTINCT domain FROM block_rules WHERE is_active = 1 ORDER BY domain",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query active domains");
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(rows.into_iter().map(|(domain,)| domain).collect())
    }
}
