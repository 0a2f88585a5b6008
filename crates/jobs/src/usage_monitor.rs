use kidsafe_application::services::UsageMonitor;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Feeds the wall clock to the usage monitor at a fixed interval.
pub struct UsageMonitorJob {
    monitor: Arc<UsageMonitor>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl UsageMonitorJob {
    pub fn new(monitor: Arc<UsageMonitor>) -> Self {
        Self {
            monitor,
            interval_secs: 30,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            "Starting usage monitor job"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("UsageMonitorJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Some(transition) = self.monitor.check().await {
                        debug!(
                            to = transition.to.to_str(),
                            gate_changed = transition.gate_changed(),
                            "Usage check produced a transition"
                        );
                    }
                }
            }
        }
    }
}
