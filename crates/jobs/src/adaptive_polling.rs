use async_trait::async_trait;
use kidsafe_application::services::{AdaptiveInterval, BackoffPolicy};
use kidsafe_application::use_cases::{
    RemoteBlocklistReconciler, SyncTimeRulesUseCase, TimeRulesOutcome,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// One cycle of a remote polling loop.
#[async_trait]
pub trait PollingTask: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns whether anything changed. Never fails: errors are logged by
    /// the task and count as "unchanged".
    async fn poll(&self) -> bool;
}

#[async_trait]
impl PollingTask for RemoteBlocklistReconciler {
    fn name(&self) -> &'static str {
        "blocklist-sync"
    }

    async fn poll(&self) -> bool {
        match self.poll_once().await {
            Ok(outcome) => outcome.is_changed(),
            Err(e) => {
                error!(error = %e, "Blocklist sync cycle failed, keeping current rules");
                false
            }
        }
    }
}

#[async_trait]
impl PollingTask for SyncTimeRulesUseCase {
    fn name(&self) -> &'static str {
        "time-rules-sync"
    }

    async fn poll(&self) -> bool {
        let outcome = self.poll_once().await;
        if let TimeRulesOutcome::NoData = outcome {
            debug!("Time rules poll found no data");
        }
        outcome.is_changed()
    }
}

/// Drives a [`PollingTask`] on an adaptive timer: idle cycles stretch the
/// wait up to the policy maximum, a change snaps it back to the base.
///
/// Cancellation is observed between cycles, never in the middle of a poll,
/// so a hosts write in progress always completes.
pub struct AdaptivePollingJob {
    task: Arc<dyn PollingTask>,
    policy: BackoffPolicy,
    shutdown: CancellationToken,
}

impl AdaptivePollingJob {
    pub fn new(task: Arc<dyn PollingTask>, policy: BackoffPolicy) -> Self {
        Self {
            task,
            policy,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn name(&self) -> &'static str {
        self.task.name()
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            job = self.task.name(),
            base_ms = self.policy.base.as_millis() as u64,
            max_ms = self.policy.max.as_millis() as u64,
            factor = self.policy.factor,
            "Starting adaptive polling job"
        );

        let mut interval = AdaptiveInterval::new(self.policy);
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let changed = self.task.poll().await;
            let wait = interval.record(changed);
            debug!(
                job = self.task.name(),
                changed,
                next_poll_ms = wait.as_millis() as u64,
                "Poll cycle finished"
            );

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        info!(job = self.task.name(), "Adaptive polling job: shutting down");
    }
}
