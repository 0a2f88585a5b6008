use kidsafe_application::use_cases::ReportPcStatusUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct StatusHeartbeatJob {
    report: Arc<ReportPcStatusUseCase>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl StatusHeartbeatJob {
    pub fn new(report: Arc<ReportPcStatusUseCase>) -> Self {
        Self {
            report,
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
            "Starting PC status heartbeat job"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("StatusHeartbeatJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    match self.report.execute().await {
                        Ok(status) => {
                            debug!(blocked_count = status.blocked_count, "Heartbeat sent");
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to report PC status");
                        }
                    }
                }
            }
        }
    }
}
