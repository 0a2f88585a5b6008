use async_trait::async_trait;
use kidsafe_application::ports::{DnsCacheFlusher, HostsWriter, WriteStrategy};
use kidsafe_domain::DomainError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Tries each write strategy in order until one succeeds.
///
/// Every attempt is bounded by `strategy_timeout`, or by the strategy's own
/// budget when that is longer. After a successful write
/// the DNS cache is flushed in the background; flush failures never reach
/// the caller.
pub struct FallbackHostsWriter {
    strategies: Vec<Arc<dyn WriteStrategy>>,
    strategy_timeout: Duration,
    flusher: Option<Arc<dyn DnsCacheFlusher>>,
}

impl FallbackHostsWriter {
    pub fn new(strategies: Vec<Arc<dyn WriteStrategy>>, strategy_timeout: Duration) -> Self {
        Self {
            strategies,
            strategy_timeout,
            flusher: None,
        }
    }

    pub fn with_flusher(mut self, flusher: Arc<dyn DnsCacheFlusher>) -> Self {
        self.flusher = Some(flusher);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn spawn_flush(&self) {
        let Some(flusher) = self.flusher.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = flusher.flush().await {
                warn!(error = %e, "DNS cache flush failed");
            }
        });
    }
}

#[async_trait]
impl HostsWriter for FallbackHostsWriter {
    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        let mut failures: Vec<String> = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let name = strategy.name();
            let budget = strategy
                .time_budget()
                .map_or(self.strategy_timeout, |b| b.max(self.strategy_timeout));
            match tokio::time::timeout(budget, strategy.write(path, content)).await {
                Ok(Ok(())) => {
                    if failures.is_empty() {
                        debug!(strategy = name, path = %path.display(), "Hosts file written");
                    } else {
                        info!(
                            strategy = name,
                            failed_before = failures.len(),
                            path = %path.display(),
                            "Hosts file written with fallback strategy"
                        );
                    }
                    self.spawn_flush();
                    return Ok(());
                }
                Ok(Err(e)) => {
                    warn!(strategy = name, error = %e, "Hosts write strategy failed");
                    failures.push(format!("{}: {}", name, e));
                }
                Err(_) => {
                    warn!(
                        strategy = name,
                        timeout_ms = budget.as_millis() as u64,
                        "Hosts write strategy timed out"
                    );
                    failures.push(format!("{}: timed out after {:?}", name, budget));
                }
            }
        }

        error!(
            path = %path.display(),
            attempts = failures.len(),
            "Every hosts write strategy failed"
        );
        Err(DomainError::HostsWriteFailed(failures))
    }
}
