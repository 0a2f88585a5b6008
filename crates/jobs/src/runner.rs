use crate::{AdaptivePollingJob, StatusHeartbeatJob, UsageMonitorJob};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub trait SpawnableJob: Send + Sync + 'static {
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self: Arc<Self>) -> JoinHandle<()>;
}

macro_rules! impl_spawnable_job {
    ($t:ty) => {
        impl SpawnableJob for $t {
            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn start_job(self: Arc<Self>) -> JoinHandle<()> {
                tokio::spawn(async move { self.start().await })
            }
        }
    };
}

impl_spawnable_job!(AdaptivePollingJob);
impl_spawnable_job!(UsageMonitorJob);
impl_spawnable_job!(StatusHeartbeatJob);

fn spawn_job<J: SpawnableJob>(
    job: Option<J>,
    shutdown: &Option<CancellationToken>,
    handles: &mut Vec<JoinHandle<()>>,
) {
    if let Some(job) = job {
        let job = match shutdown {
            Some(token) => job.with_cancellation(token.clone()),
            None => job,
        };
        handles.push(Arc::new(job).start_job());
    }
}

/// Starts the background loops. Every job shares the shutdown token; the
/// returned handles finish once it is cancelled.
pub struct JobRunner {
    blocklist_sync: Option<AdaptivePollingJob>,
    time_rules_sync: Option<AdaptivePollingJob>,
    usage_monitor: Option<UsageMonitorJob>,
    status_heartbeat: Option<StatusHeartbeatJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            blocklist_sync: None,
            time_rules_sync: None,
            usage_monitor: None,
            status_heartbeat: None,
            shutdown: None,
        }
    }

    pub fn with_blocklist_sync(mut self, job: AdaptivePollingJob) -> Self {
        self.blocklist_sync = Some(job);
        self
    }

    pub fn with_time_rules_sync(mut self, job: AdaptivePollingJob) -> Self {
        self.time_rules_sync = Some(job);
        self
    }

    pub fn with_usage_monitor(mut self, job: UsageMonitorJob) -> Self {
        self.usage_monitor = Some(job);
        self
    }

    pub fn with_status_heartbeat(mut self, job: StatusHeartbeatJob) -> Self {
        self.status_heartbeat = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub async fn start(self) -> Vec<JoinHandle<()>> {
        info!("Starting background job runner");

        let mut handles = Vec::new();
        spawn_job(self.blocklist_sync, &self.shutdown, &mut handles);
        spawn_job(self.time_rules_sync, &self.shutdown, &mut handles);
        spawn_job(self.usage_monitor, &self.shutdown, &mut handles);
        spawn_job(self.status_heartbeat, &self.shutdown, &mut handles);

        info!(jobs = handles.len(), "All background jobs started");
        handles
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
