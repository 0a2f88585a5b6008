use async_trait::async_trait;
use kidsafe_application::ports::{
    HostsFileStore, HostsWriter, NetworkGate, RemoteStore, ResolutionProbe, UsageStore,
};
use kidsafe_domain::{DomainError, UsageLedger};
use kidsafe_jobs::PollingTask;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Polling task whose outcomes are scripted; once the script runs out every
/// poll reports `default_changed`.
pub struct MockPollingTask {
    script: Arc<RwLock<VecDeque<bool>>>,
    default_changed: bool,
    polls: AtomicU64,
}

impl MockPollingTask {
    pub fn new(default_changed: bool) -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_changed,
            polls: AtomicU64::new(0),
        }
    }

    pub async fn push(&self, changed: bool) {
        self.script.write().await.push_back(changed);
    }

    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PollingTask for MockPollingTask {
    fn name(&self) -> &'static str {
        "mock-poll"
    }

    async fn poll(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.script
            .write()
            .await
            .pop_front()
            .unwrap_or(self.default_changed)
    }
}

pub struct MockNetworkGate {
    blocked: AtomicBool,
    block_calls: AtomicU64,
    unblock_calls: AtomicU64,
}

impl MockNetworkGate {
    pub fn new() -> Self {
        Self {
            blocked: AtomicBool::new(false),
            block_calls: AtomicU64::new(0),
            unblock_calls: AtomicU64::new(0),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
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
        self.blocked.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn unblock(&self) -> Result<(), DomainError> {
        self.unblock_calls.fetch_add(1, Ordering::SeqCst);
        self.blocked.store(false, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockUsageStore {
    ledger: Arc<RwLock<UsageLedger>>,
}

impl MockUsageStore {
    pub fn new() -> Self {
        Self::with_ledger(UsageLedger::default())
    }

    pub fn with_ledger(ledger: UsageLedger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
        }
    }
}

#[async_trait]
impl UsageStore for MockUsageStore {
    async fn load(&self) -> Result<UsageLedger, DomainError> {
        Ok(self.ledger.read().await.clone())
    }

    async fn save(&self, ledger: &UsageLedger) -> Result<(), DomainError> {
        *self.ledger.write().await = ledger.clone();
        Ok(())
    }
}

pub struct MockRemoteStore {
    documents: Arc<RwLock<HashMap<String, Value>>>,
    should_fail: AtomicBool,
    set_calls: AtomicU64,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            should_fail: AtomicBool::new(false),
            set_calls: AtomicU64::new(0),
        }
    }

    pub async fn put(&self, path: &str, value: Value) {
        self.documents.write().await.insert(path.to_string(), value);
    }

    pub async fn written(&self, path: &str) -> Option<Value> {
        self.documents.read().await.get(path).cloned()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_calls(&self) -> u64 {
        self.set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::RemoteFetch {
                path: path.to_string(),
                reason: "mock failure".to_string(),
            });
        }
        Ok(self.documents.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), DomainError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::RemoteFetch {
                path: path.to_string(),
                reason: "mock failure".to_string(),
            });
        }
        self.documents
            .write()
            .await
            .insert(path.to_string(), value.clone());
        Ok(())
    }
}

pub struct MockHostsFile {
    content: Arc<RwLock<String>>,
}

impl MockHostsFile {
    pub fn new(content: &str) -> Self {
        Self {
            content: Arc::new(RwLock::new(content.to_string())),
        }
    }

    pub async fn content(&self) -> String {
        self.content.read().await.clone()
    }
}

#[async_trait]
impl HostsFileStore for MockHostsFile {
    async fn read(&self) -> Result<String, DomainError> {
        Ok(self.content.read().await.clone())
    }

    async fn read_backup(&self) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn write_backup(&self, _content: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn remove_backup(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl HostsWriter for MockHostsFile {
    async fn write(&self, _path: &Path, content: &str) -> Result<(), DomainError> {
        *self.content.write().await = content.to_string();
        Ok(())
    }
}

pub struct MockResolutionProbe;

#[async_trait]
impl ResolutionProbe for MockResolutionProbe {
    async fn resolve(&self, _domain: &str) -> Result<Vec<IpAddr>, DomainError> {
        Ok(Vec::new())
    }
}
