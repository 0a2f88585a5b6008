pub mod adaptive_polling;
pub mod runner;
pub mod status_heartbeat;
pub mod usage_monitor;

pub use adaptive_polling::{AdaptivePollingJob, PollingTask};
pub use runner::JobRunner;
pub use status_heartbeat::StatusHeartbeatJob;
pub use usage_monitor::UsageMonitorJob;
