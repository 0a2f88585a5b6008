use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::DomainError;
use crate::remote_rule::decode_keyed_records;

/// Screen-time rule as written by the companion app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteTimeRule {
    pub active: bool,
    pub added_by: String,
    pub break_duration_minutes: u32,
    pub break_interval_minutes: u32,
    pub created_at: i64,
    pub daily_limit_minutes: u32,
    pub description: String,
    pub name: String,
    pub rule_type: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRuleSnapshot {
    rules: BTreeMap<String, RemoteTimeRule>,
}

impl TimeRuleSnapshot {
    pub fn new(rules: BTreeMap<String, RemoteTimeRule>) -> Self {
        Self { rules }
    }

    pub fn from_value(value: &Value) -> Result<(Self, Vec<String>), DomainError> {
        let (rules, skipped) = decode_keyed_records::<RemoteTimeRule>(value, "rule")?;
        Ok((Self { rules }, skipped))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &BTreeMap<String, RemoteTimeRule> {
        &self.rules
    }

    /// Canonical serialization of the records in key order. Two snapshots
    /// with equal fingerprints carry the same rules.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(&self.rules).unwrap_or_default()
    }
}

/// Inclusive window of local wall-clock time, compared at minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: NaiveTime) -> bool {
        let at = NaiveTime::from_hms_opt(at.hour(), at.minute(), 0).unwrap_or(at);
        self.start <= at && at <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRule {
    pub enabled: bool,
    /// Zero means no daily limit.
    pub daily_limit_minutes: u32,
    pub break_interval_minutes: u32,
    pub break_duration_minutes: u32,
    /// Empty means any time of day is allowed.
    pub allowed_slots: Vec<TimeSlot>,
}

impl DayRule {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn has_daily_limit(&self) -> bool {
        self.daily_limit_minutes > 0
    }

    pub fn requires_breaks(&self) -> bool {
        self.break_interval_minutes > 0 && self.break_duration_minutes > 0
    }

    pub fn is_allowed_at(&self, at: NaiveTime) -> bool {
        self.allowed_slots.is_empty() || self.allowed_slots.iter().any(|s| s.contains(at))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRules {
    pub weekdays: DayRule,
    pub weekends: DayRule,
}

impl TimeRules {
    /// Collapses every active remote rule into one day rule holding the
    /// largest value of each limit, used for weekdays and weekends alike.
    /// Without any active rule both days are disabled.
    pub fn from_remote(snapshot: &TimeRuleSnapshot) -> Self {
        let active: Vec<&RemoteTimeRule> = snapshot.rules.values().filter(|r| r.active).collect();
        if active.is_empty() {
            return Self::default();
        }

        let day = DayRule {
            enabled: true,
            daily_limit_minutes: active.iter().map(|r| r.daily_limit_minutes).max().unwrap_or(0),
            break_interval_minutes: active
                .iter()
                .map(|r| r.break_interval_minutes)
                .max()
                .unwrap_or(0),
            break_duration_minutes: active
                .iter()
                .map(|r| r.break_duration_minutes)
                .max()
                .unwrap_or(0),
            allowed_slots: Vec::new(),
        };

        Self {
            weekdays: day.clone(),
            weekends: day,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.weekdays.enabled || self.weekends.enabled
    }

    pub fn for_date(&self, date: NaiveDate) -> &DayRule {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => &self.weekends,
            _ => &self.weekdays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn slot_end_minute_is_inclusive() {
        let slot = TimeSlot::new(hm(8, 0), hm(23, 59));
        assert!(slot.contains(NaiveTime::from_hms_opt(23, 59, 45).unwrap()));
        assert!(!slot.contains(hm(7, 59)));
    }

    #[test]
    fn weekend_dates_pick_weekend_rule() {
        let rules = TimeRules {
            weekdays: DayRule::disabled(),
            weekends: DayRule {
                enabled: true,
                ..DayRule::default()
            },
        };
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert!(rules.for_date(saturday).enabled);
        assert!(!rules.for_date(monday).enabled);
    }
}
