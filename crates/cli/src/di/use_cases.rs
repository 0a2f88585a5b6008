use super::{Repositories, Services};
use kidsafe_application::ports::RuleRepository;
use kidsafe_application::services::{expand_candidate_paths, expand_path, RemotePathPoller};
use kidsafe_application::use_cases::{
    AddBlockRuleUseCase, ApplyRulesToHostsUseCase, DeleteBlockRuleUseCase, GetBlockRulesUseCase,
    RemoteBlocklistReconciler, ReportPcStatusUseCase, SyncTimeRulesUseCase,
};
use kidsafe_domain::Config;
use std::sync::Arc;
use tracing::{info, warn};

pub struct UseCases {
    pub add_rule: Arc<AddBlockRuleUseCase>,
    pub delete_rule: Arc<DeleteBlockRuleUseCase>,
    pub get_rules: Arc<GetBlockRulesUseCase>,
    pub apply_rules: Arc<ApplyRulesToHostsUseCase>,
    pub blocklist_sync: Option<Arc<RemoteBlocklistReconciler>>,
    pub time_rules_sync: Option<Arc<SyncTimeRulesUseCase>>,
    pub report_status: Option<Arc<ReportPcStatusUseCase>>,
}

impl UseCases {
    pub fn new(config: &Config, repos: &Repositories, services: &Services) -> Self {
        let rules: Arc<dyn RuleRepository> = repos.rules.clone();

        let mut use_cases = Self {
            add_rule: Arc::new(AddBlockRuleUseCase::new(
                rules.clone(),
                services.hosts.clone(),
                services.events.clone(),
            )),
            delete_rule: Arc::new(DeleteBlockRuleUseCase::new(
                rules.clone(),
                services.hosts.clone(),
                services.events.clone(),
            )),
            get_rules: Arc::new(GetBlockRulesUseCase::new(rules.clone())),
            apply_rules: Arc::new(ApplyRulesToHostsUseCase::new(
                rules.clone(),
                services.hosts.clone(),
            )),
            blocklist_sync: None,
            time_rules_sync: None,
            report_status: None,
        };

        let Some(remote) = services.remote.clone() else {
            return use_cases;
        };
        if services.identities.is_empty() {
            warn!("Remote sync enabled but no identity could be derived");
        }

        let sync = &config.sync;
        let blocked_paths = expand_candidate_paths(&sync.blocked_url_paths, &services.identities);
        let time_rule_paths = expand_candidate_paths(&sync.time_rule_paths, &services.identities);
        info!(
            identities = services.identities.len(),
            blocked_url_paths = blocked_paths.len(),
            time_rule_paths = time_rule_paths.len(),
            "Remote candidate paths resolved"
        );

        use_cases.blocklist_sync = Some(Arc::new(RemoteBlocklistReconciler::new(
            sync.family_id.clone().unwrap_or_default(),
            RemotePathPoller::new(remote.clone(), blocked_paths),
            rules,
            services.hosts.clone(),
            services.events.clone(),
        )));

        if !time_rule_paths.is_empty() {
            use_cases.time_rules_sync = Some(Arc::new(SyncTimeRulesUseCase::new(
                RemotePathPoller::new(remote.clone(), time_rule_paths),
                services.usage_monitor.clone(),
            )));
        }

        if let Some(uid) = services.identities.first() {
            use_cases.report_status = Some(Arc::new(ReportPcStatusUseCase::new(
                remote,
                services.hosts.clone(),
                expand_path(&sync.status_path, uid),
                env!("CARGO_PKG_VERSION").to_string(),
            )));
        }

        use_cases
    }
}
