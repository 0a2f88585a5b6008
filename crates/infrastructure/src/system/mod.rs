pub mod command_runner;
pub mod network_gate;
pub mod privileges;
pub mod usage_store;

pub use command_runner::TokioCommandRunner;
pub use network_gate::{FirewallBackend, FirewallNetworkGate};
pub use privileges::is_elevated;
pub use usage_store::JsonUsageStore;
