use async_trait::async_trait;
use kidsafe_application::ports::{
    HostsFileStore, HostsWriter, NetworkGate, RemoteStore, ResolutionProbe, RuleRepository,
    UsageStore,
};
use kidsafe_domain::{DomainError, LocalRule, RuleCategory, UsageLedger};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

// ── Hosts file ───────────────────────────────────────────────────────────────

/// In-memory hosts file acting as both the store and the privileged writer.
pub struct MockHostsFile {
    content: Arc<RwLock<Option<String>>>,
    backup: Arc<RwLock<Option<String>>>,
    should_fail_write: Arc<RwLock<bool>>,
    should_fail_backup: Arc<RwLock<bool>>,
    write_count: AtomicU64,
}

impl MockHostsFile {
    pub fn new(initial: &str) -> Self {
        Self {
            content: Arc::new(RwLock::new(Some(initial.to_string()))),
            backup: Arc::new(RwLock::new(None)),
            should_fail_write: Arc::new(RwLock::new(false)),
            should_fail_backup: Arc::new(RwLock::new(false)),
            write_count: AtomicU64::new(0),
        }
    }

    pub fn unreadable() -> Self {
        let file = Self::new("");
        *file.content.try_write().unwrap() = None;
        file
    }

    pub async fn content(&self) -> String {
        self.content.read().await.clone().unwrap_or_default()
    }

    pub async fn set_content(&self, content: &str) {
        *self.content.write().await = Some(content.to_string());
    }

    pub async fn backup(&self) -> Option<String> {
        self.backup.read().await.clone()
    }

    pub async fn set_backup(&self, backup: Option<&str>) {
        *self.backup.write().await = backup.map(str::to_string);
    }

    pub async fn set_should_fail_write(&self, fail: bool) {
        *self.should_fail_write.write().await = fail;
    }

    pub async fn set_should_fail_backup(&self, fail: bool) {
        *self.should_fail_backup.write().await = fail;
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostsFileStore for MockHostsFile {
    async fn read(&self) -> Result<String, DomainError> {
        self.content
            .read()
            .await
            .clone()
            .ok_or_else(|| DomainError::HostsFileUnreadable("mock unreadable".to_string()))
    }

    async fn read_backup(&self) -> Result<Option<String>, DomainError> {
        Ok(self.backup.read().await.clone())
    }

    async fn write_backup(&self, content: &str) -> Result<(), DomainError> {
        if *self.should_fail_backup.read().await {
            return Err(DomainError::IoError("mock backup failure".to_string()));
        }
        *self.backup.write().await = Some(content.to_string());
        Ok(())
    }

    async fn remove_backup(&self) -> Result<(), DomainError> {
        *self.backup.write().await = None;
        Ok(())
    }
}

#[async_trait]
impl HostsWriter for MockHostsFile {
    async fn write(&self, _path: &Path, content: &str) -> Result<(), DomainError> {
        if *self.should_fail_write.read().await {
            return Err(DomainError::HostsWriteFailed(vec![
                "direct-write: access denied".to_string(),
            ]));
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        *self.content.write().await = Some(content.to_string());
        Ok(())
    }
}

// ── Rule repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockRuleRepository {
    rules: Arc<RwLock<Vec<LocalRule>>>,
    next_id: Arc<RwLock<i64>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockRuleRepository {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(1)),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    pub async fn count(&self) -> usize {
        self.rules.read().await.len()
    }

    pub async fn domains_in(&self, category: &RuleCategory) -> Vec<String> {
        let mut domains: Vec<String> = self
            .rules
            .read()
            .await
            .iter()
            .filter(|r| &r.category == category)
            .map(|r| r.domain.to_string())
            .collect();
        domains.sort();
        domains
    }

    async fn check_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::DatabaseError("mock failure".to_string()));
        }
        Ok(())
    }
}

impl Default for MockRuleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleRepository for MockRuleRepository {
    async fn insert(&self, rule: &LocalRule) -> Result<LocalRule, DomainError> {
        self.check_fail().await?;
        let mut rules = self.rules.write().await;

        if rules
            .iter()
            .any(|r| r.domain == rule.domain && r.category == rule.category)
        {
            return Err(DomainError::InvalidRule(format!(
                "Rule for '{}' in '{}' already exists",
                rule.domain, rule.category
            )));
        }

        let mut next_id = self.next_id.write().await;
        let mut created = rule.clone();
        created.id = Some(*next_id);
        created.created_at = Some("2026-01-01 00:00:00".to_string());
        *next_id += 1;

        rules.push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<LocalRule>, DomainError> {
        self.check_fail().await?;
        Ok(self
            .rules
            .read()
            .await
            .iter()
            .find(|r| r.id == Some(id))
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<LocalRule>, DomainError> {
        self.check_fail().await?;
        let mut rules = self.rules.read().await.clone();
        rules.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rules)
    }

    async fn get_by_category(&self, category: &RuleCategory) -> Result<Vec<LocalRule>, DomainError> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|r| &r.category == category)
            .collect())
    }

    async fn upsert_active(&self, domain: &str, category: &RuleCategory) -> Result<(), DomainError> {
        self.check_fail().await?;
        {
            let mut rules = self.rules.write().await;
            if let Some(existing) = rules
                .iter_mut()
                .find(|r| r.domain.as_ref() == domain && &r.category == category)
            {
                existing.is_active = true;
                return Ok(());
            }
        }
        let rule = if category.is_remote_sync() {
            LocalRule::remote_sync(Arc::from(domain))
        } else {
            LocalRule::new(Arc::from(domain), category.clone(), None)
        };
        self.insert(&rule).await.map(|_| ())
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.check_fail().await?;
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| r.id != Some(id));
        if rules.len() == before {
            return Err(DomainError::RuleNotFound(id));
        }
        Ok(())
    }

    async fn delete_by_category_except(
        &self,
        category: &RuleCategory,
        keep: &BTreeSet<String>,
    ) -> Result<u64, DomainError> {
        self.check_fail().await?;
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| &r.category != category || keep.contains(r.domain.as_ref()));
        Ok((before - rules.len()) as u64)
    }

    async fn get_active_domains(&self) -> Result<Vec<String>, DomainError> {
        self.check_fail().await?;
        let domains: BTreeSet<String> = self
            .rules
            .read()
            .await
            .iter()
            .filter(|r| r.is_active)
            .map(|r| r.domain.to_string())
            .collect();
        Ok(domains.into_iter().collect())
    }
}

// ── Remote store ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockRemoteStore {
    data: Arc<RwLock<HashMap<String, Value>>>,
    failing_paths: Arc<RwLock<HashSet<String>>>,
    get_log: Arc<RwLock<Vec<String>>>,
    written: Arc<RwLock<HashMap<String, Value>>>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            failing_paths: Arc::new(RwLock::new(HashSet::new())),
            get_log: Arc::new(RwLock::new(Vec::new())),
            written: Arc::new(RwLock::new(HashMap::new())),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn put(&self, path: &str, value: Value) {
        self.data.write().await.insert(path.to_string(), value);
    }

    pub async fn remove(&self, path: &str) {
        self.data.write().await.remove(path);
    }

    pub async fn fail_path(&self, path: &str) {
        self.failing_paths.write().await.insert(path.to_string());
    }

    pub async fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().await = should_fail;
    }

    pub async fn get_log(&self) -> Vec<String> {
        self.get_log.read().await.clone()
    }

    pub async fn clear_log(&self) {
        self.get_log.write().await.clear();
    }

    pub async fn written(&self, path: &str) -> Option<Value> {
        self.written.read().await.get(path).cloned()
    }
}

impl Default for MockRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, DomainError> {
        self.get_log.write().await.push(path.to_string());

        if *self.should_fail.read().await || self.failing_paths.read().await.contains(path) {
            return Err(DomainError::RemoteFetch {
                path: path.to_string(),
                reason: "mock network error".to_string(),
            });
        }
        Ok(self.data.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::RemoteFetch {
                path: path.to_string(),
                reason: "mock network error".to_string(),
            });
        }
        self.written
            .write()
            .await
            .insert(path.to_string(), value.clone());
        Ok(())
    }
}

// ── Resolution probe ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockResolutionProbe {
    answers: Arc<RwLock<HashMap<String, Vec<IpAddr>>>>,
}

impl MockResolutionProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_answer(&self, domain: &str, addrs: Vec<IpAddr>) {
        self.answers.write().await.insert(domain.to_string(), addrs);
    }
}

#[async_trait]
impl ResolutionProbe for MockResolutionProbe {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, DomainError> {
        self.answers
            .read()
            .await
            .get(domain)
            .cloned()
            .ok_or_else(|| DomainError::IoError(format!("no answer for {}", domain)))
    }
}

// ── Network gate ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNetworkGate {
    block_calls: AtomicU64,
    unblock_calls: AtomicU64,
    blocked: Arc<RwLock<bool>>,
}

impl MockNetworkGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_blocked(&self) -> bool {
        *self.blocked.read().await
    }

    pub fn block_calls(&self) -> u64 {
        self.block_calls.load(Ordering::SeqCst)
    }

    pub fn unblock_calls(&self) -> u64 {
        self.unblock_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkGate for MockNetworkGate {
    async fn block(&self) -> Result<(), DomainError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        *self.blocked.write().await = true;
        Ok(())
    }

    async fn unblock(&self) -> Result<(), DomainError> {
        self.unblock_calls.fetch_add(1, Ordering::SeqCst);
        *self.blocked.write().await = false;
        Ok(())
    }
}

// ── Usage store ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockUsageStore {
    ledger: Arc<RwLock<UsageLedger>>,
    save_count: AtomicU64,
}

impl MockUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ledger(&self) -> UsageLedger {
        self.ledger.read().await.clone()
    }

    pub fn save_count(&self) -> u64 {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageStore for MockUsageStore {
    async fn load(&self) -> Result<UsageLedger, DomainError> {
        Ok(self.ledger.read().await.clone())
    }

    async fn save(&self, ledger: &UsageLedger) -> Result<(), DomainError> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        *self.ledger.write().await = ledger.clone();
        Ok(())
    }
}
