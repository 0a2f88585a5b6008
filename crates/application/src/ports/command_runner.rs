use async_trait::async_trait;
use kidsafe_domain::DomainError;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Converts a non-zero exit into `DomainError::CommandFailed`.
    pub fn into_result(self, program: &str) -> Result<CommandOutput, DomainError> {
        if self.success() {
            return Ok(self);
        }
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        };
        Err(DomainError::CommandFailed(format!(
            "{} exited with {}: {}",
            program,
            self.status
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            detail
        )))
    }
}

/// Runs an OS process without a console window and captures its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Fails with `DomainError::CommandTimeout` when `timeout` elapses; the
    /// child is killed in that case.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, DomainError>;
}
