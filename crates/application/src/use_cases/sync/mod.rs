mod reconcile_blocklist;
mod report_pc_status;
mod sync_time_rules;

pub use reconcile_blocklist::{PollOutcome, ReconcilerStatus, RemoteBlocklistReconciler};
pub use report_pc_status::{PcStatus, ReportPcStatusUseCase};
pub use sync_time_rules::{SyncTimeRulesUseCase, TimeRulesOutcome};
