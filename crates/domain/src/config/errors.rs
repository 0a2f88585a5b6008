#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Cannot write configuration file {path}: {reason}")]
    FileWrite { path: String, reason: String },

    #[error("Invalid TOML in configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}
