use kidsafe_domain::{TimeRuleSnapshot, TimeRules};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::services::{RemoteHit, RemotePathPoller, UsageMonitor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRulesOutcome {
    NoData,
    Unchanged { path: String },
    Changed { path: String, active_rules: usize },
}

impl TimeRulesOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, TimeRulesOutcome::Changed { .. })
    }
}

/// Polls screen-time rules and hands them to the usage monitor when their
/// fingerprint changes. Missing data keeps the current rules.
pub struct SyncTimeRulesUseCase {
    poller: RemotePathPoller,
    monitor: Arc<UsageMonitor>,
    last_fingerprint: Mutex<Option<String>>,
}

impl SyncTimeRulesUseCase {
    pub fn new(poller: RemotePathPoller, monitor: Arc<UsageMonitor>) -> Self {
        Self {
            poller,
            monitor,
            last_fingerprint: Mutex::new(None),
        }
    }

    pub async fn poll_once(&self) -> TimeRulesOutcome {
        let decoded = self
            .poller
            .fetch_first(true, |path, value| match TimeRuleSnapshot::from_value(value) {
                Ok((snapshot, skipped)) => {
                    if !skipped.is_empty() {
                        warn!(path = %path, ?skipped, "Skipped undecodable time rules");
                    }
                    (!snapshot.is_empty()).then_some(snapshot)
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Time rules could not be decoded");
                    None
                }
            })
            .await;
        let Some(RemoteHit {
            path,
            data: snapshot,
        }) = decoded
        else {
            debug!("No remote time rules found");
            return TimeRulesOutcome::NoData;
        };

        let fingerprint = snapshot.fingerprint();
        let mut last = self.last_fingerprint.lock().await;
        if last.as_deref() == Some(fingerprint.as_str()) {
            return TimeRulesOutcome::Unchanged { path };
        }

        let active_rules = snapshot.rules().values().filter(|r| r.active).count();
        self.monitor
            .update_rules(TimeRules::from_remote(&snapshot))
            .await;
        *last = Some(fingerprint);

        info!(path = %path, rules = snapshot.len(), active_rules, "Time rules synced");
        TimeRulesOutcome::Changed {
            path,
            active_rules,
        }
    }
}
