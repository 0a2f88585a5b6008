use async_trait::async_trait;
use kidsafe_application::ports::{CommandRunner, NetworkGate};
use kidsafe_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const RULE_PREFIX: &str = "KidSafe Time Block";

const WEB_PORTS: [(&str, &str); 2] = [("HTTP", "80"), ("HTTPS", "443")];

/// Firewall flavour used to express the outbound block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallBackend {
    /// Windows Defender Firewall through `netsh advfirewall`.
    Netsh,
    /// Linux `iptables` OUTPUT chain, tagged with a comment.
    Iptables,
}

impl FirewallBackend {
    pub fn for_current_os() -> Self {
        if cfg!(windows) {
            FirewallBackend::Netsh
        } else {
            FirewallBackend::Iptables
        }
    }
}

/// Blocks outbound web traffic (TCP 80/443) with named firewall rules.
pub struct FirewallNetworkGate {
    runner: Arc<dyn CommandRunner>,
    backend: FirewallBackend,
    timeout: Duration,
}

impl FirewallNetworkGate {
    pub fn new(runner: Arc<dyn CommandRunner>, backend: FirewallBackend, timeout: Duration) -> Self {
        Self {
            runner,
            backend,
            timeout,
        }
    }

    /// `(program, args)` for every command needed to add the block rules.
    pub fn block_commands(&self) -> Vec<(&'static str, Vec<String>)> {
        WEB_PORTS
            .iter()
            .map(|(label, port)| match self.backend {
                FirewallBackend::Netsh => (
                    "netsh",
                    args(&[
                        "advfirewall",
                        "firewall",
                        "add",
                        "rule",
                        &format!("name={} {}", RULE_PREFIX, label),
                        "dir=out",
                        "action=block",
                        "protocol=TCP",
                        &format!("remoteport={}", port),
                    ]),
                ),
                FirewallBackend::Iptables => (
                    "iptables",
                    iptables_args("-I", label, port),
                ),
            })
            .collect()
    }

    pub fn unblock_commands(&self) -> Vec<(&'static str, Vec<String>)> {
        WEB_PORTS
            .iter()
            .map(|(label, port)| match self.backend {
                FirewallBackend::Netsh => (
                    "netsh",
                    args(&[
                        "advfirewall",
                        "firewall",
                        "delete",
                        "rule",
                        &format!("name={} {}", RULE_PREFIX, label),
                    ]),
                ),
                FirewallBackend::Iptables => (
                    "iptables",
                    iptables_args("-D", label, port),
                ),
            })
            .collect()
    }

    async fn run_all(
        &self,
        commands: Vec<(&'static str, Vec<String>)>,
        tolerate_failure: bool,
    ) -> Result<(), DomainError> {
        for (program, args) in commands {
            let output = self.runner.run(program, &args, self.timeout).await?;
            if tolerate_failure && !output.success() {
                debug!(program, ?args, "Firewall rule was not present");
                continue;
            }
            output.into_result(program)?;
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkGate for FirewallNetworkGate {
    async fn block(&self) -> Result<(), DomainError> {
        // Stale rules from a crashed run would otherwise pile up.
        self.run_all(self.unblock_commands(), true).await?;
        self.run_all(self.block_commands(), false).await?;
        info!(backend = ?self.backend, "Outbound web traffic blocked");
        Ok(())
    }

    async fn unblock(&self) -> Result<(), DomainError> {
        self.run_all(self.unblock_commands(), true).await?;
        info!(backend = ?self.backend, "Outbound web traffic allowed");
        Ok(())
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn iptables_args(action: &str, label: &str, port: &str) -> Vec<String> {
    args(&[
        action,
        "OUTPUT",
        "-p",
        "tcp",
        "--dport",
        port,
        "-m",
        "comment",
        "--comment",
        &format!("{} {}", RULE_PREFIX, label),
        "-j",
        "REJECT",
    ])
}
