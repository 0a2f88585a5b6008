use chrono::{DateTime, Utc};
use kidsafe_domain::{normalize_domain, DomainError, RemoteSnapshot, RuleCategory};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::ports::RuleRepository;
use crate::services::{AgentEvent, EventBus, HostsBlocker, RemotePathPoller};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No candidate path held data; local state was left untouched.
    NoData,
    Unchanged { path: String },
    Changed { path: String, active: usize },
}

impl PollOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, PollOutcome::Changed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcilerStatus {
    pub family_id: String,
    pub preferred_path: Option<String>,
    pub candidate_paths: usize,
    pub record_count: usize,
    pub active_count: usize,
    pub last_change: Option<DateTime<Utc>>,
    pub has_data: bool,
}

#[derive(Default)]
struct ReconcilerState {
    last_seen: Option<RemoteSnapshot>,
    last_change: Option<DateTime<Utc>>,
}

/// Converges the `firebase-sync` rules and the hosts file to the active
/// blocked URLs found remotely.
///
/// The last-seen snapshot only advances after both the rule store and the
/// hosts file were updated, so a failed apply is retried on the next poll.
pub struct RemoteBlocklistReconciler {
    family_id: String,
    poller: RemotePathPoller,
    repo: Arc<dyn RuleRepository>,
    hosts: Arc<HostsBlocker>,
    events: EventBus,
    state: Mutex<ReconcilerState>,
}

impl RemoteBlocklistReconciler {
    pub fn new(
        family_id: String,
        poller: RemotePathPoller,
        repo: Arc<dyn RuleRepository>,
        hosts: Arc<HostsBlocker>,
        events: EventBus,
    ) -> Self {
        Self {
            family_id,
            poller,
            repo,
            hosts,
            events,
            state: Mutex::new(ReconcilerState::default()),
        }
    }

    /// One polling cycle. Only an apply failure is an error; fetch failures
    /// and empty paths end as `NoData`.
    pub async fn poll_once(&self) -> Result<PollOutcome, DomainError> {
        let Some((path, snapshot)) = self.fetch(true).await else {
            debug!(
                candidates = self.poller.candidates().len(),
                "No remote blocklist data found"
            );
            return Ok(PollOutcome::NoData);
        };

        let mut state = self.state.lock().await;
        if let Some(previous) = &state.last_seen {
            let diff = snapshot.diff(previous);
            if diff.is_empty() {
                debug!(path = %path, records = snapshot.len(), "Remote blocklist unchanged");
                return Ok(PollOutcome::Unchanged { path });
            }
            info!(
                path = %path,
                added = diff.added.len(),
                changed = diff.changed.len(),
                removed = diff.removed.len(),
                "Remote blocklist changed"
            );
        } else {
            info!(path = %path, records = snapshot.len(), "Remote blocklist loaded");
        }

        let active = self.apply(&snapshot).await?;
        state.last_seen = Some(snapshot);
        state.last_change = Some(Utc::now());
        drop(state);

        self.events.emit(AgentEvent::RemoteSynced {
            path: path.clone(),
            active,
        });
        Ok(PollOutcome::Changed { path, active })
    }

    /// Scans every candidate path, ignoring the preferred one, and applies
    /// whatever it finds even if unchanged.
    #[instrument(skip(self))]
    pub async fn force_sync(&self) -> Result<PollOutcome, DomainError> {
        let Some((path, snapshot)) = self.fetch(false).await else {
            warn!("Forced sync found no remote data");
            return Err(DomainError::NoRemoteData(self.poller.candidates().len()));
        };

        let mut state = self.state.lock().await;
        let active = self.apply(&snapshot).await?;
        state.last_seen = Some(snapshot);
        state.last_change = Some(Utc::now());
        drop(state);

        info!(path = %path, active, "Forced sync applied");
        self.events.emit(AgentEvent::RemoteSynced {
            path: path.clone(),
            active,
        });
        Ok(PollOutcome::Changed { path, active })
    }

    pub async fn status(&self) -> ReconcilerStatus {
        let state = self.state.lock().await;
        let (record_count, active_count) = state
            .last_seen
            .as_ref()
            .map(|s| (s.len(), s.active_count()))
            .unwrap_or((0, 0));

        ReconcilerStatus {
            family_id: self.family_id.clone(),
            preferred_path: self.poller.preferred().await,
            candidate_paths: self.poller.candidates().len(),
            record_count,
            active_count,
            last_change: state.last_change,
            has_data: state.last_seen.is_some(),
        }
    }

    async fn fetch(&self, use_preference: bool) -> Option<(String, RemoteSnapshot)> {
        let hit = self
            .poller
            .fetch_first(use_preference, |path, value| {
                match RemoteSnapshot::from_value(value) {
                    Ok((snapshot, skipped)) => {
                        if !skipped.is_empty() {
                            warn!(path = %path, ?skipped, "Skipped undecodable remote records");
                        }
                        (!snapshot.is_empty()).then_some(snapshot)
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, "Remote blocklist could not be decoded");
                        None
                    }
                }
            })
            .await?;
        Some((hit.path, hit.data))
    }

    /// Store first, then hosts: the hosts file gets the union of every
    /// active rule, so it has to see the reconciled rows.
    async fn apply(&self, snapshot: &RemoteSnapshot) -> Result<usize, DomainError> {
        let active = snapshot.active_domains();
        let category = RuleCategory::RemoteSync;

        for domain in &active {
            self.repo.upsert_active(domain, &category).await?;
        }
        let removed = self.repo.delete_by_category_except(&category, &active).await?;

        self.events.emit(AgentEvent::RulesChanged {
            source: category.to_string(),
        });

        let union: BTreeSet<String> = self
            .repo
            .get_active_domains()
            .await?
            .iter()
            .map(|d| normalize_domain(d))
            .filter(|d| !d.is_empty())
            .collect();

        if let Err(e) = self.hosts.replace_all(&union).await {
            error!(error = %e, "Failed to apply remote blocklist to hosts file");
            return Err(e);
        }

        info!(
            active = active.len(),
            removed_rules = removed,
            blocked_total = union.len(),
            "Remote blocklist applied"
        );
        Ok(active.len())
    }
}
