use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Block rule not found: {0}")]
    RuleNotFound(i64),

    #[error("Invalid block rule: {0}")]
    InvalidRule(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Hosts file could not be read: {0}")]
    HostsFileUnreadable(String),

    #[error("All hosts file write strategies failed: {}", .0.join("; "))]
    HostsWriteFailed(Vec<String>),

    #[error("Write strategy '{strategy}' failed: {reason}")]
    WriteStrategyFailed { strategy: String, reason: String },

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Command timed out after {secs}s: {program}")]
    CommandTimeout { program: String, secs: u64 },

    #[error("Remote fetch error at {path}: {reason}")]
    RemoteFetch { path: String, reason: String },

    #[error("Remote data could not be decoded: {0}")]
    RemoteDecode(String),

    #[error("No remote data found in any of the {0} candidate paths")]
    NoRemoteData(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn strategy(strategy: &str, reason: impl ToString) -> Self {
        Self::WriteStrategyFailed {
            strategy: strategy.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
