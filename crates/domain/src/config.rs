pub mod database;
pub mod errors;
pub mod hosts;
pub mod logging;
pub mod root;
pub mod sync;
pub mod time_limits;

pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use hosts::{HostsConfig, ShutdownMode};
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use sync::{IdentityStrategy, SyncConfig};
pub use time_limits::TimeLimitsConfig;
