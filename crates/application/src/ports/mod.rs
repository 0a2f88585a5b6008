mod command_runner;
mod dns_cache_flusher;
mod hosts_file_store;
mod hosts_writer;
mod network_gate;
mod remote_store;
mod resolution_probe;
mod rule_repository;
mod usage_store;

pub use command_runner::{CommandOutput, CommandRunner};
pub use dns_cache_flusher::DnsCacheFlusher;
pub use hosts_file_store::HostsFileStore;
pub use hosts_writer::{HostsWriter, WriteStrategy};
pub use network_gate::NetworkGate;
pub use remote_store::RemoteStore;
pub use resolution_probe::ResolutionProbe;
pub use rule_repository::RuleRepository;
pub use usage_store::UsageStore;
