use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::time_rules::DayRule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSession {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub sessions: Vec<UsageSession>,
    pub total_minutes: i64,
}

/// Closed usage sessions per local date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLedger {
    pub days: BTreeMap<NaiveDate, DailyUsage>,
}

impl UsageLedger {
    pub fn minutes_on(&self, date: NaiveDate) -> i64 {
        self.days.get(&date).map(|d| d.total_minutes).unwrap_or(0)
    }

    /// Records a session under the date it ended on.
    pub fn record(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> &UsageSession {
        let duration_minutes = (end - start).num_minutes().max(0);
        let day = self.days.entry(end.date()).or_default();
        day.total_minutes += duration_minutes;
        day.sessions.push(UsageSession {
            start,
            end,
            duration_minutes,
        });
        &day.sessions[day.sessions.len() - 1]
    }

    /// Drops days older than `keep_days` before `today`.
    pub fn prune(&mut self, today: NaiveDate, keep_days: i64) {
        self.days
            .retain(|date, _| (today - *date).num_days() < keep_days);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    OutsideAllowedHours,
    DailyLimitReached { used_minutes: i64, limit_minutes: u32 },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::OutsideAllowedHours => write!(f, "outside allowed hours"),
            BlockReason::DailyLimitReached {
                used_minutes,
                limit_minutes,
            } => write!(
                f,
                "daily limit of {} minutes reached ({} used)",
                limit_minutes, used_minutes
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AccessState {
    /// No time rule applies; usage is not tracked.
    Unrestricted,
    Open { session_started: NaiveDateTime },
    OnBreak { started: NaiveDateTime },
    Blocked { reason: BlockReason },
}

impl AccessState {
    pub fn is_blocked(&self) -> bool {
        matches!(self, AccessState::OnBreak { .. } | AccessState::Blocked { .. })
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            AccessState::Unrestricted => "unrestricted",
            AccessState::Open { .. } => "open",
            AccessState::OnBreak { .. } => "on_break",
            AccessState::Blocked { .. } => "blocked",
        }
    }

    /// Human readable cause of the current state.
    pub fn describe(&self) -> String {
        match self {
            AccessState::Unrestricted => "no time rule active".to_string(),
            AccessState::Open { .. } => "within allowed time".to_string(),
            AccessState::OnBreak { .. } => "mandatory break".to_string(),
            AccessState::Blocked { reason } => reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTransition {
    pub from: AccessState,
    pub to: AccessState,
    pub closed_session: Option<UsageSession>,
}

impl AccessTransition {
    /// Whether network access has to be toggled for this transition.
    pub fn gate_changed(&self) -> bool {
        self.from.is_blocked() != self.to.is_blocked()
    }
}

/// Screen-time state machine.
///
/// `tick` is driven by a periodic check with the current local time and the
/// rule for that day; it returns a transition only when the state changes.
#[derive(Debug, Clone)]
pub struct UsageTracker {
    state: AccessState,
    ledger: UsageLedger,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new(UsageLedger::default())
    }
}

impl UsageTracker {
    pub fn new(ledger: UsageLedger) -> Self {
        Self {
            state: AccessState::Unrestricted,
            ledger,
        }
    }

    pub fn state(&self) -> AccessState {
        self.state
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn prune_history(&mut self, today: NaiveDate, keep_days: i64) {
        self.ledger.prune(today, keep_days);
    }

    /// Minutes used on `now`'s date, including the open session.
    pub fn minutes_used(&self, now: NaiveDateTime) -> i64 {
        let open = match self.state {
            AccessState::Open { session_started } => (now - session_started).num_minutes().max(0),
            _ => 0,
        };
        self.ledger.minutes_on(now.date()) + open
    }

    pub fn tick(&mut self, now: NaiveDateTime, rule: Option<&DayRule>) -> Option<AccessTransition> {
        let next = self.next_state(now, rule);
        if next == self.state {
            return None;
        }
        Some(self.transition(now, next))
    }

    /// Closes the open session, if any, and drops to `Unrestricted`.
    pub fn close(&mut self, now: NaiveDateTime) -> Option<AccessTransition> {
        if self.state == AccessState::Unrestricted {
            return None;
        }
        Some(self.transition(now, AccessState::Unrestricted))
    }

    fn next_state(&self, now: NaiveDateTime, rule: Option<&DayRule>) -> AccessState {
        let rule = match rule {
            Some(r) if r.enabled => r,
            _ => return AccessState::Unrestricted,
        };

        if !rule.is_allowed_at(now.time()) {
            return AccessState::Blocked {
                reason: BlockReason::OutsideAllowedHours,
            };
        }

        if rule.has_daily_limit() {
            let used = self.minutes_used(now);
            if used >= i64::from(rule.daily_limit_minutes) {
                return AccessState::Blocked {
                    reason: BlockReason::DailyLimitReached {
                        used_minutes: used,
                        limit_minutes: rule.daily_limit_minutes,
                    },
                };
            }
        }

        match self.state {
            AccessState::OnBreak { started } => {
                if !rule.requires_breaks()
                    || (now - started).num_minutes() >= i64::from(rule.break_duration_minutes)
                {
                    AccessState::Open {
                        session_started: now,
                    }
                } else {
                    self.state
                }
            }
            AccessState::Open { session_started } => {
                if rule.requires_breaks()
                    && (now - session_started).num_minutes()
                        >= i64::from(rule.break_interval_minutes)
                {
                    AccessState::OnBreak { started: now }
                } else {
                    self.state
                }
            }
            AccessState::Blocked { .. } | AccessState::Unrestricted => AccessState::Open {
                session_started: now,
            },
        }
    }

    fn transition(&mut self, now: NaiveDateTime, next: AccessState) -> AccessTransition {
        let from = self.state;
        let closed_session = match from {
            AccessState::Open { session_started } => {
                Some(self.ledger.record(session_started, now).clone())
            }
            _ => None,
        };
        self.state = next;
        AccessTransition {
            from,
            to: next,
            closed_session,
        }
    }
}
