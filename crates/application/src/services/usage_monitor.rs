use chrono::{Local, NaiveDateTime};
use kidsafe_domain::{AccessState, AccessTransition, TimeRules, UsageTracker};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use super::event_bus::{AgentEvent, EventBus};
use crate::ports::{NetworkGate, UsageStore};

#[derive(Debug, Clone, Serialize)]
pub struct UsageStatus {
    pub state: AccessState,
    pub blocked: bool,
    pub reason: String,
    pub minutes_today: i64,
    pub rules_enabled: bool,
}

/// Drives the screen-time state machine: feeds it the wall clock and the
/// current rules, toggles the network gate on blocking transitions and
/// persists closed sessions.
pub struct UsageMonitor {
    tracker: Mutex<UsageTracker>,
    rules: RwLock<TimeRules>,
    gate: Arc<dyn NetworkGate>,
    store: Arc<dyn UsageStore>,
    events: EventBus,
    history_days: i64,
}

impl UsageMonitor {
    pub fn new(
        gate: Arc<dyn NetworkGate>,
        store: Arc<dyn UsageStore>,
        events: EventBus,
        history_days: i64,
    ) -> Self {
        Self {
            tracker: Mutex::new(UsageTracker::default()),
            rules: RwLock::new(TimeRules::default()),
            gate,
            store,
            events,
            history_days,
        }
    }

    /// Loads persisted usage; a corrupt or unreadable store starts empty.
    pub async fn load(&self) {
        match self.store.load().await {
            Ok(ledger) => {
                *self.tracker.lock().await = UsageTracker::new(ledger);
            }
            Err(e) => warn!(error = %e, "Failed to load usage data, starting empty"),
        }
    }

    pub async fn update_rules(&self, rules: TimeRules) {
        info!(
            weekdays_limit = rules.weekdays.daily_limit_minutes,
            weekends_limit = rules.weekends.daily_limit_minutes,
            enabled = rules.is_enabled(),
            "Time rules updated"
        );
        *self.rules.write().await = rules;
    }

    pub async fn rules(&self) -> TimeRules {
        self.rules.read().await.clone()
    }

    pub async fn check(&self) -> Option<AccessTransition> {
        self.check_at(Local::now().naive_local()).await
    }

    pub async fn check_at(&self, now: NaiveDateTime) -> Option<AccessTransition> {
        let rules = self.rules.read().await.clone();
        let rule = rules.for_date(now.date());

        let mut tracker = self.tracker.lock().await;
        let transition = tracker.tick(now, Some(rule))?;

        info!(
            from = transition.from.to_str(),
            to = transition.to.to_str(),
            reason = %transition.to.describe(),
            "Access state changed"
        );

        if transition.gate_changed() {
            self.apply_gate(transition.to.is_blocked()).await;
            self.events.emit(AgentEvent::AccessChanged {
                blocked: transition.to.is_blocked(),
                reason: transition.to.describe(),
            });
        }

        if transition.closed_session.is_some() {
            tracker.prune_history(now.date(), self.history_days);
            if let Err(e) = self.store.save(tracker.ledger()).await {
                error!(error = %e, "Failed to save usage data");
            }
        }

        Some(transition)
    }

    /// Closes the open session, persists usage and reopens the network.
    pub async fn shutdown(&self) {
        let now = Local::now().naive_local();
        let mut tracker = self.tracker.lock().await;
        let was_blocked = tracker.state().is_blocked();

        if tracker.close(now).is_some() {
            if let Err(e) = self.store.save(tracker.ledger()).await {
                error!(error = %e, "Failed to save usage data on shutdown");
            }
        }

        if was_blocked {
            self.apply_gate(false).await;
        }
    }

    pub async fn status(&self) -> UsageStatus {
        let now = Local::now().naive_local();
        let tracker = self.tracker.lock().await;
        let state = tracker.state();
        UsageStatus {
            state,
            blocked: state.is_blocked(),
            reason: state.describe(),
            minutes_today: tracker.minutes_used(now),
            rules_enabled: self.rules.read().await.is_enabled(),
        }
    }

    async fn apply_gate(&self, blocked: bool) {
        let result = if blocked {
            self.gate.block().await
        } else {
            self.gate.unblock().await
        };
        match result {
            Ok(()) if blocked => info!("Network access blocked"),
            Ok(()) => info!("Network access restored"),
            Err(e) => error!(error = %e, blocked, "Failed to toggle network access"),
        }
    }
}
