mod backoff;
mod event_bus;
mod hosts_blocker;
mod identity;
mod remote_path_poller;
mod usage_monitor;

pub use backoff::{AdaptiveInterval, BackoffPolicy};
pub use event_bus::{AgentEvent, EventBus};
pub use hosts_blocker::{HostsBlocker, HostsBlockerConfig};
pub use identity::{derive_identities, expand_candidate_paths, expand_path, legacy_email_uid};
pub use remote_path_poller::{RemoteHit, RemotePathPoller};
pub use usage_monitor::{UsageMonitor, UsageStatus};
