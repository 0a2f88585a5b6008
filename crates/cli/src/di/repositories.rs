use kidsafe_infrastructure::repositories::SqliteRuleRepository;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct Repositories {
    pub rules: Arc<SqliteRuleRepository>,
}

impl Repositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            rules: Arc::new(SqliteRuleRepository::new(pool)),
        }
    }
}
