use kidsafe_domain::{
    normalize_domain, render_managed_content, strip_managed_section, verify_entries, DomainError,
};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::event_bus::{AgentEvent, EventBus};
use crate::ports::{HostsFileStore, HostsWriter, ResolutionProbe};

#[derive(Debug, Clone)]
pub struct HostsBlockerConfig {
    pub hosts_path: PathBuf,
    pub redirect_ip: String,
}

/// Owns the blocked-domain set and the managed section of the hosts file.
///
/// Every mutation holds `write_lock` across render and write, and the
/// in-memory set is only replaced once the write succeeded, so a failed
/// write leaves both the file and the set as they were.
pub struct HostsBlocker {
    config: HostsBlockerConfig,
    store: Arc<dyn HostsFileStore>,
    writer: Arc<dyn HostsWriter>,
    probe: Arc<dyn ResolutionProbe>,
    events: EventBus,
    write_lock: Mutex<()>,
    domains: RwLock<BTreeSet<String>>,
    original: RwLock<Option<String>>,
}

impl HostsBlocker {
    pub fn new(
        config: HostsBlockerConfig,
        store: Arc<dyn HostsFileStore>,
        writer: Arc<dyn HostsWriter>,
        probe: Arc<dyn ResolutionProbe>,
        events: EventBus,
    ) -> Self {
        Self {
            config,
            store,
            writer,
            probe,
            events,
            write_lock: Mutex::new(()),
            domains: RwLock::new(BTreeSet::new()),
            original: RwLock::new(None),
        }
    }

    pub fn redirect_ip(&self) -> &str {
        &self.config.redirect_ip
    }

    /// Captures the current hosts file as the restore point and copies it to
    /// the backup file. An unreadable hosts file is fatal; a failed backup
    /// only warns.
    ///
    /// A managed section left behind by an earlier run is not part of the
    /// restore point.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), DomainError> {
        let content = self.store.read().await?;
        let snapshot = strip_managed_section(&content);

        if let Err(e) = self.store.write_backup(&snapshot).await {
            warn!(error = %e, "Failed to back up hosts file");
        }

        *self.original.write().await = Some(snapshot);
        info!(path = %self.config.hosts_path.display(), "Hosts file snapshot captured");
        Ok(())
    }

    pub async fn add_domain(&self, raw: &str) -> Result<(), DomainError> {
        let domain = normalize(raw)?;
        let _guard = self.write_lock.lock().await;

        let mut next = self.domains.read().await.clone();
        if !next.insert(domain.clone()) {
            debug!(domain = %domain, "Domain already blocked");
            return Ok(());
        }

        self.commit(next).await?;
        info!(domain = %domain, "Domain blocked");
        Ok(())
    }

    pub async fn remove_domain(&self, raw: &str) -> Result<(), DomainError> {
        let domain = normalize(raw)?;
        let _guard = self.write_lock.lock().await;

        let mut next = self.domains.read().await.clone();
        if !next.remove(&domain) {
            debug!(domain = %domain, "Domain was not blocked");
            return Ok(());
        }

        self.commit(next).await?;
        info!(domain = %domain, "Domain unblocked");
        Ok(())
    }

    /// Replaces the whole blocked set. Inputs are normalized; unusable ones
    /// are dropped.
    pub async fn replace_all<I, S>(&self, domains: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next: BTreeSet<String> = domains
            .into_iter()
            .map(|d| normalize_domain(d.as_ref()))
            .filter(|d| !d.is_empty())
            .collect();

        let _guard = self.write_lock.lock().await;
        let count = next.len();
        self.commit(next).await?;
        info!(domains = count, "Blocked domain set replaced");
        Ok(())
    }

    pub async fn get_blocked_domains(&self) -> Vec<String> {
        self.domains.read().await.iter().cloned().collect()
    }

    pub async fn blocked_count(&self) -> usize {
        self.domains.read().await.len()
    }

    pub async fn is_blocked(&self, raw: &str) -> bool {
        let domain = normalize_domain(raw);
        !domain.is_empty() && self.domains.read().await.contains(&domain)
    }

    /// Writes back the backup file if one exists, else the startup snapshot,
    /// then forgets every blocked domain.
    #[instrument(skip(self))]
    pub async fn restore_original(&self) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;

        let backup = match self.store.read_backup().await {
            Ok(backup) => backup,
            Err(e) => {
                warn!(error = %e, "Failed to read hosts backup, using startup snapshot");
                None
            }
        };
        let content = match backup {
            Some(content) => content,
            None => self.original.read().await.clone().ok_or_else(|| {
                DomainError::IoError("No hosts backup or startup snapshot to restore".to_string())
            })?,
        };

        self.writer.write(&self.config.hosts_path, &content).await?;
        self.remove_backup().await;
        self.domains.write().await.clear();

        info!("Original hosts file restored");
        self.events.emit(AgentEvent::HostsApplied { domains: 0 });
        Ok(())
    }

    /// Removes the managed section from the live file, keeping any edits
    /// made outside it, and deletes the backup.
    #[instrument(skip(self))]
    pub async fn cleanup(&self) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;

        let current = self.current_content().await?;
        let stripped = strip_managed_section(&current);
        self.writer.write(&self.config.hosts_path, &stripped).await?;
        self.remove_backup().await;
        self.domains.write().await.clear();

        info!("Managed hosts section removed");
        self.events.emit(AgentEvent::HostsApplied { domains: 0 });
        Ok(())
    }

    /// Hostnames found in the managed section of the live file, mapped to
    /// whether they point at the redirect address.
    pub async fn verify_hosts_file(&self) -> Result<BTreeMap<String, bool>, DomainError> {
        let content = self.store.read().await?;
        Ok(verify_entries(&content, &self.config.redirect_ip))
    }

    /// Best effort: resolution failures count as "not blocked".
    pub async fn test_domain_blocking(&self, raw: &str) -> bool {
        let domain = normalize_domain(raw);
        if domain.is_empty() {
            return false;
        }
        let Ok(redirect) = self.config.redirect_ip.parse::<IpAddr>() else {
            return false;
        };

        match self.probe.resolve(&domain).await {
            Ok(addrs) => {
                let blocked = addrs.contains(&redirect);
                debug!(domain = %domain, ?addrs, blocked, "Resolution probe finished");
                blocked
            }
            Err(e) => {
                debug!(domain = %domain, error = %e, "Resolution probe failed");
                false
            }
        }
    }

    /// Renders `next` into the live file and adopts it on success. Callers
    /// hold `write_lock`.
    async fn commit(&self, next: BTreeSet<String>) -> Result<(), DomainError> {
        let current = self.current_content().await?;
        let content = render_managed_content(&current, &next, &self.config.redirect_ip);

        if let Err(e) = self.writer.write(&self.config.hosts_path, &content).await {
            error!(error = %e, "Failed to write hosts file");
            return Err(e);
        }

        let count = next.len();
        *self.domains.write().await = next;
        self.events.emit(AgentEvent::HostsApplied { domains: count });
        Ok(())
    }

    /// The live file, or the startup snapshot when the file cannot be read.
    async fn current_content(&self) -> Result<String, DomainError> {
        match self.store.read().await {
            Ok(content) => Ok(content),
            Err(e) => match self.original.read().await.clone() {
                Some(snapshot) => {
                    warn!(error = %e, "Could not read hosts file, using startup snapshot");
                    Ok(snapshot)
                }
                None => Err(e),
            },
        }
    }

    async fn remove_backup(&self) {
        if let Err(e) = self.store.remove_backup().await {
            warn!(error = %e, "Failed to remove hosts backup");
        }
    }
}

fn normalize(raw: &str) -> Result<String, DomainError> {
    let domain = normalize_domain(raw);
    if domain.is_empty() {
        return Err(DomainError::InvalidDomainName(raw.to_string()));
    }
    Ok(domain)
}
