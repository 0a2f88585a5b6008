//! KidSafe PC agent domain layer
pub mod config;
pub mod errors;
pub mod hosts_section;
pub mod normalize;
pub mod remote_rule;
pub mod rule;
pub mod time_rules;
pub mod usage;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use hosts_section::{
    parse_managed_section, render_managed_content, strip_managed_section, verify_entries,
    HostsEntry, DEFAULT_REDIRECT_IP, SECTION_END, SECTION_START,
};
pub use normalize::{normalize_domain, www_variant};
pub use remote_rule::{RemoteRule, RemoteSnapshot, SnapshotDiff};
pub use rule::{LocalRule, RuleCategory, REMOTE_SYNC_CATEGORY};
pub use time_rules::{DayRule, RemoteTimeRule, TimeRuleSnapshot, TimeRules, TimeSlot};
pub use usage::{AccessState, AccessTransition, BlockReason, UsageLedger, UsageTracker};
