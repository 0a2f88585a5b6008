use async_trait::async_trait;
use kidsafe_application::ports::{CommandRunner, DnsCacheFlusher};
use kidsafe_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Flushes the OS resolver cache so new hosts entries apply immediately.
pub struct SystemDnsFlusher {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl SystemDnsFlusher {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    pub fn flush_command() -> (&'static str, Vec<String>) {
        if cfg!(windows) {
            ("ipconfig", vec!["/flushdns".to_string()])
        } else if cfg!(target_os = "macos") {
            ("dscacheutil", vec!["-flushcache".to_string()])
        } else {
            ("resolvectl", vec!["flush-caches".to_string()])
        }
    }
}

#[async_trait]
impl DnsCacheFlusher for SystemDnsFlusher {
    async fn flush(&self) -> Result<(), DomainError> {
        let (program, args) = Self::flush_command();
        self.runner
            .run(program, &args, self.timeout)
            .await?
            .into_result(program)?;
        debug!(program, "DNS cache flushed");
        Ok(())
    }
}
