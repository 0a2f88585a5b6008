use async_trait::async_trait;
use kidsafe_application::ports::{CommandOutput, CommandRunner, DnsCacheFlusher, WriteStrategy};
use kidsafe_domain::DomainError;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Records every invocation and answers from a queue of canned outputs;
/// exit code 0 once the queue is empty.
#[derive(Clone, Default)]
pub struct MockCommandRunner {
    calls: Arc<RwLock<Vec<(String, Vec<String>)>>>,
    finished: Arc<RwLock<Vec<(String, Vec<String>)>>>,
    outputs: Arc<RwLock<VecDeque<Result<CommandOutput, DomainError>>>>,
    delay: Option<Duration>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command takes `delay` before it returns.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Commands that ran to completion, in order.
    pub async fn finished(&self) -> Vec<(String, Vec<String>)> {
        self.finished.read().await.clone()
    }

    pub async fn push_output(&self, status: i32, stderr: &str) {
        self.outputs.write().await.push_back(Ok(CommandOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }));
    }

    pub async fn push_error(&self, error: DomainError) {
        self.outputs.write().await.push_back(Err(error));
    }

    pub async fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.read().await.clone()
    }

    pub async fn programs(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        _timeout: Duration,
    ) -> Result<CommandOutput, DomainError> {
        self.calls
            .write()
            .await
            .push((program.to_string(), args.to_vec()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.finished
            .write()
            .await
            .push((program.to_string(), args.to_vec()));
        self.outputs
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| {
                Ok(CommandOutput {
                    status: Some(0),
                    ..Default::default()
                })
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyBehavior {
    Succeed,
    Fail,
    Hang,
}

/// Strategy double that writes the file for real when it succeeds.
pub struct MockStrategy {
    name: &'static str,
    behavior: StrategyBehavior,
    attempts: AtomicU64,
}

impl MockStrategy {
    pub fn new(name: &'static str, behavior: StrategyBehavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            attempts: AtomicU64::new(0),
        })
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WriteStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            StrategyBehavior::Succeed => {
                tokio::fs::write(path, content).await?;
                Ok(())
            }
            StrategyBehavior::Fail => Err(DomainError::strategy(self.name, "access denied")),
            StrategyBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct MockFlusher {
    flushes: AtomicU64,
    should_fail: bool,
}

impl MockFlusher {
    pub fn new(should_fail: bool) -> Arc<Self> {
        Arc::new(Self {
            flushes: AtomicU64::new(0),
            should_fail,
        })
    }

    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsCacheFlusher for MockFlusher {
    async fn flush(&self) -> Result<(), DomainError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(DomainError::CommandFailed("ipconfig exited with 1".to_string()));
        }
        Ok(())
    }
}
