use anyhow::Context;
use kidsafe_application::ports::{CommandRunner, RemoteStore};
use kidsafe_application::services::{
    derive_identities, EventBus, HostsBlocker, HostsBlockerConfig, UsageMonitor,
};
use kidsafe_domain::Config;
use kidsafe_infrastructure::hosts::{
    default_strategies, FallbackHostsWriter, SystemDnsFlusher, SystemHostsFile,
    SystemResolutionProbe,
};
use kidsafe_infrastructure::remote::FirebaseRestStore;
use kidsafe_infrastructure::system::{
    FirewallBackend, FirewallNetworkGate, JsonUsageStore, TokioCommandRunner,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const EVENT_CAPACITY: usize = 64;
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Services {
    pub events: EventBus,
    pub hosts: Arc<HostsBlocker>,
    pub usage_monitor: Arc<UsageMonitor>,
    /// `None` when remote sync is disabled.
    pub remote: Option<Arc<dyn RemoteStore>>,
    /// Remote user identifiers in configured strategy order.
    pub identities: Vec<String>,
}

impl Services {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let events = EventBus::new(EVENT_CAPACITY);
        let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner::new());
        let strategy_timeout = Duration::from_secs(config.hosts.strategy_timeout_secs);

        let mut writer = FallbackHostsWriter::new(
            default_strategies(runner.clone(), strategy_timeout),
            strategy_timeout,
        );
        if config.hosts.flush_dns {
            writer = writer.with_flusher(Arc::new(SystemDnsFlusher::new(
                runner.clone(),
                FLUSH_TIMEOUT,
            )));
        }
        info!(
            strategies = ?writer.strategy_names(),
            flush_dns = config.hosts.flush_dns,
            "Hosts writer configured"
        );

        let hosts = Arc::new(HostsBlocker::new(
            HostsBlockerConfig {
                hosts_path: PathBuf::from(&config.hosts.path),
                redirect_ip: config.hosts.redirect_ip.clone(),
            },
            Arc::new(SystemHostsFile::new(
                &config.hosts.path,
                config.hosts.backup_path(),
            )),
            Arc::new(writer),
            Arc::new(SystemResolutionProbe::new(PROBE_TIMEOUT)),
            events.clone(),
        ));

        let usage_monitor = Arc::new(UsageMonitor::new(
            Arc::new(FirewallNetworkGate::new(
                runner,
                FirewallBackend::for_current_os(),
                strategy_timeout,
            )),
            Arc::new(JsonUsageStore::new(&config.time_limits.usage_file)),
            events.clone(),
            config.time_limits.history_days,
        ));

        let sync = &config.sync;
        let remote: Option<Arc<dyn RemoteStore>> = match (&sync.database_url, sync.enabled) {
            (Some(url), true) => Some(Arc::new(
                FirebaseRestStore::new(
                    url,
                    sync.auth_token.clone(),
                    Duration::from_secs(sync.request_timeout_secs),
                )
                .context("Failed to create remote store client")?,
            )),
            _ => None,
        };

        let identities = derive_identities(
            &sync.identities,
            sync.family_id.as_deref(),
            sync.user_email.as_deref(),
        );

        Ok(Self {
            events,
            hosts,
            usage_monitor,
            remote,
            identities,
        })
    }
}
