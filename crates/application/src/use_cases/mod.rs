pub mod rules;
pub mod sync;

pub use rules::{
    AddBlockRuleUseCase, ApplyRulesToHostsUseCase, DeleteBlockRuleUseCase, GetBlockRulesUseCase,
};
pub use sync::{
    PcStatus, PollOutcome, ReconcilerStatus, RemoteBlocklistReconciler, ReportPcStatusUseCase,
    SyncTimeRulesUseCase, TimeRulesOutcome,
};
