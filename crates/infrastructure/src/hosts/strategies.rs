use async_trait::async_trait;
use kidsafe_application::ports::{CommandOutput, CommandRunner, WriteStrategy};
use kidsafe_domain::DomainError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

use super::file_store::read_lossy;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Slack on top of command timeouts for the temp-file and read-back steps.
const FILE_STEP_GRACE: Duration = Duration::from_secs(2);

fn unique_suffix() -> String {
    format!(
        "{}.{}",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "hosts".to_string())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Temp file in the user's temp directory holding `content`.
async fn write_temp(content: &str) -> std::io::Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("kidsafe-hosts.{}.tmp", unique_suffix()));
    fs::write(&path, content).await?;
    Ok(path)
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        debug!(path = %path.display(), error = %e, "Temp file not removed");
    }
}

/// Commands that report success without doing anything (a dismissed UAC
/// prompt still exits 0) are caught by reading the target back.
async fn verify_written(strategy: &str, path: &Path, content: &str) -> Result<(), DomainError> {
    let actual = read_lossy(path)
        .await
        .map_err(|e| DomainError::strategy(strategy, format!("read back failed: {}", e)))?;
    if actual != content {
        return Err(DomainError::strategy(
            strategy,
            "command finished but the file was not updated",
        ));
    }
    Ok(())
}

fn command_error(strategy: &str, err: DomainError) -> DomainError {
    DomainError::strategy(strategy, err)
}

async fn run_checked(
    runner: &dyn CommandRunner,
    strategy: &str,
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<CommandOutput, DomainError> {
    runner
        .run(program, args, timeout)
        .await
        .and_then(|out| out.into_result(program))
        .map_err(|e| command_error(strategy, e))
}

// ── 1. direct write ──────────────────────────────────────────────────────────

/// Plain overwrite; works when the agent already runs elevated.
#[derive(Debug, Default)]
pub struct DirectWrite;

#[async_trait]
impl WriteStrategy for DirectWrite {
    fn name(&self) -> &'static str {
        "direct-write"
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        fs::write(path, content)
            .await
            .map_err(|e| DomainError::strategy(self.name(), e))
    }
}

// ── 2. temp file + rename ────────────────────────────────────────────────────

/// Writes a sibling temp file and renames it over the target, for ACLs that
/// allow create and rename in the directory but not in-place writes.
#[derive(Debug, Default)]
pub struct AtomicRename;

#[async_trait]
impl WriteStrategy for AtomicRename {
    fn name(&self) -> &'static str {
        "atomic-rename"
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name(path), unique_suffix()));

        fs::write(&tmp, content)
            .await
            .map_err(|e| DomainError::strategy(self.name(), e))?;

        if let Err(e) = fs::rename(&tmp, path).await {
            remove_quietly(&tmp).await;
            return Err(DomainError::strategy(self.name(), e));
        }
        Ok(())
    }
}

// ── 3. elevated shell ────────────────────────────────────────────────────────

/// Copies a temp file into place through an elevated shell: a `RunAs`
/// PowerShell on Windows, non-interactive `sudo` elsewhere.
pub struct ElevatedShell {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl ElevatedShell {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    pub fn command(source: &Path, target: &Path) -> (&'static str, Vec<String>) {
        if cfg!(windows) {
            let copy = format!(
                "Start-Process -FilePath cmd.exe -ArgumentList '/c copy /Y \"{}\" \"{}\"' -Verb RunAs -Wait -WindowStyle Hidden",
                display(source),
                display(target)
            );
            (
                "powershell",
                vec![
                    "-NoProfile".to_string(),
                    "-NonInteractive".to_string(),
                    "-Command".to_string(),
                    copy,
                ],
            )
        } else {
            (
                "sudo",
                vec![
                    "-n".to_string(),
                    "sh".to_string(),
                    "-c".to_string(),
                    "cat \"$1\" > \"$2\"".to_string(),
                    "sh".to_string(),
                    display(source),
                    display(target),
                ],
            )
        }
    }
}

#[async_trait]
impl WriteStrategy for ElevatedShell {
    fn name(&self) -> &'static str {
        "elevated-shell"
    }

    fn time_budget(&self) -> Option<Duration> {
        Some(self.timeout + FILE_STEP_GRACE)
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        let tmp = write_temp(content)
            .await
            .map_err(|e| DomainError::strategy(self.name(), e))?;

        let (program, args) = Self::command(&tmp, path);
        let result = run_checked(self.runner.as_ref(), self.name(), program, &args, self.timeout).await;
        remove_quietly(&tmp).await;

        result?;
        verify_written(self.name(), path, content).await
    }
}

// ── 4. privileged copy ───────────────────────────────────────────────────────

/// Low-level copy tool with backup semantics: `robocopy /B` on Windows,
/// `sudo -n cp` elsewhere.
pub struct PrivilegedCopy {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl PrivilegedCopy {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// robocopy exit codes below 8 mean the copy went through.
    fn robocopy_ok(output: &CommandOutput) -> bool {
        matches!(output.status, Some(code) if (0..8).contains(&code))
    }

    pub fn command(source_dir: &Path, source: &Path, target: &Path) -> (&'static str, Vec<String>) {
        if cfg!(windows) {
            let target_dir = target
                .parent()
                .map(display)
                .unwrap_or_else(|| ".".to_string());
            (
                "robocopy",
                vec![
                    display(source_dir),
                    target_dir,
                    file_name(target),
                    "/B".to_string(),
                    "/R:0".to_string(),
                    "/W:0".to_string(),
                    "/NJH".to_string(),
                    "/NJS".to_string(),
                ],
            )
        } else {
            (
                "sudo",
                vec![
                    "-n".to_string(),
                    "cp".to_string(),
                    display(source),
                    display(target),
                ],
            )
        }
    }
}

#[async_trait]
impl WriteStrategy for PrivilegedCopy {
    fn name(&self) -> &'static str {
        "privileged-copy"
    }

    fn time_budget(&self) -> Option<Duration> {
        Some(self.timeout + FILE_STEP_GRACE)
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        // robocopy copies by name, so the source must carry the target's name.
        let dir = std::env::temp_dir().join(format!("kidsafe-copy.{}", unique_suffix()));
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::strategy(self.name(), e))?;
        let source = dir.join(file_name(path));

        let result = async {
            fs::write(&source, content)
                .await
                .map_err(|e| DomainError::strategy(self.name(), e))?;

            let (program, args) = Self::command(&dir, &source, path);
            let output = self
                .runner
                .run(program, &args, self.timeout)
                .await
                .map_err(|e| command_error(self.name(), e))?;

            if cfg!(windows) {
                if !Self::robocopy_ok(&output) {
                    return Err(DomainError::strategy(
                        self.name(),
                        format!("robocopy exited with {:?}", output.status),
                    ));
                }
            } else {
                output
                    .into_result(program)
                    .map_err(|e| command_error(self.name(), e))?;
            }
            verify_written(self.name(), path, content).await
        }
        .await;

        if let Err(e) = fs::remove_dir_all(&dir).await {
            debug!(path = %dir.display(), error = %e, "Temp directory not removed");
        }
        result
    }
}

// ── 5. take ownership, grant, write, restore ─────────────────────────────────

const PERMISSION_RESET: &str = "permission-reset";

/// SYSTEM, the stock owner of the Windows hosts file. `icacls /save` keeps
/// the DACL only, so the owner is handed back explicitly.
const WINDOWS_HOSTS_OWNER: &str = "*S-1-5-18";

/// Takes ownership and opens the file's permissions, writes directly, then
/// puts the owner and permissions back. The restore runs whether or not the
/// write succeeded, and keeps running if the caller stops waiting.
pub struct PermissionReset {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl PermissionReset {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Run in order before the write; the first failure skips the write.
    pub fn grant_commands(target: &Path, acl_backup: &Path) -> Vec<(&'static str, Vec<String>)> {
        let target = display(target);
        if cfg!(windows) {
            vec![
                (
                    "icacls",
                    vec![
                        target.clone(),
                        "/save".to_string(),
                        display(acl_backup),
                        "/Q".to_string(),
                    ],
                ),
                ("takeown", vec!["/F".to_string(), target.clone()]),
                (
                    "icacls",
                    vec![target, "/grant".to_string(), "*S-1-1-0:F".to_string()],
                ),
            ]
        } else {
            vec![(
                "sudo",
                vec![
                    "-n".to_string(),
                    "chmod".to_string(),
                    "a+w".to_string(),
                    target,
                ],
            )]
        }
    }

    /// Run after the write; every step runs even if an earlier one failed.
    pub fn restore_commands(
        target: &Path,
        mode: Option<u32>,
        acl_backup: &Path,
    ) -> Vec<(&'static str, Vec<String>)> {
        if cfg!(windows) {
            let dir = target
                .parent()
                .map(display)
                .unwrap_or_else(|| ".".to_string());
            vec![
                (
                    "icacls",
                    vec![
                        dir,
                        "/restore".to_string(),
                        display(acl_backup),
                        "/Q".to_string(),
                    ],
                ),
                (
                    "icacls",
                    vec![
                        display(target),
                        "/setowner".to_string(),
                        WINDOWS_HOSTS_OWNER.to_string(),
                    ],
                ),
            ]
        } else {
            let mode = format!("{:o}", mode.unwrap_or(0o644));
            vec![(
                "sudo",
                vec!["-n".to_string(), "chmod".to_string(), mode, display(target)],
            )]
        }
    }

    #[cfg(unix)]
    async fn current_mode(path: &Path) -> Option<u32> {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path)
            .await
            .ok()
            .map(|m| m.permissions().mode() & 0o7777)
    }

    #[cfg(not(unix))]
    async fn current_mode(_path: &Path) -> Option<u32> {
        None
    }

    async fn grant_write_restore(
        runner: Arc<dyn CommandRunner>,
        timeout: Duration,
        path: PathBuf,
        content: String,
    ) -> Result<(), DomainError> {
        let mode = Self::current_mode(&path).await;
        let acl_backup =
            std::env::temp_dir().join(format!("kidsafe-acl.{}.txt", unique_suffix()));

        let mut result = Ok(());
        for (program, args) in Self::grant_commands(&path, &acl_backup) {
            result = run_checked(runner.as_ref(), PERMISSION_RESET, program, &args, timeout)
                .await
                .map(|_| ());
            if result.is_err() {
                break;
            }
        }

        if result.is_ok() {
            result = match tokio::time::timeout(timeout, fs::write(&path, &content)).await {
                Ok(written) => written.map_err(|e| DomainError::strategy(PERMISSION_RESET, e)),
                Err(_) => Err(DomainError::strategy(
                    PERMISSION_RESET,
                    format!("write timed out after {:?}", timeout),
                )),
            };
        }

        for (program, args) in Self::restore_commands(&path, mode, &acl_backup) {
            if let Err(e) =
                run_checked(runner.as_ref(), PERMISSION_RESET, program, &args, timeout).await
            {
                warn!(path = %path.display(), error = %e, "Failed to restore hosts file permissions");
            }
        }

        if cfg!(windows) {
            remove_quietly(&acl_backup).await;
        }
        result
    }
}

#[async_trait]
impl WriteStrategy for PermissionReset {
    fn name(&self) -> &'static str {
        PERMISSION_RESET
    }

    fn time_budget(&self) -> Option<Duration> {
        let placeholder = Path::new("hosts");
        let commands = Self::grant_commands(placeholder, placeholder).len()
            + Self::restore_commands(placeholder, None, placeholder).len();
        // One timeout per command plus one for the write itself.
        Some(self.timeout * (commands as u32 + 1) + FILE_STEP_GRACE)
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        let task = tokio::spawn(Self::grant_write_restore(
            self.runner.clone(),
            self.timeout,
            path.to_path_buf(),
            content.to_string(),
        ));
        task.await
            .map_err(|e| DomainError::strategy(PERMISSION_RESET, e))?
    }
}

/// The five strategies in the order they are tried.
pub fn default_strategies(
    runner: Arc<dyn CommandRunner>,
    command_timeout: Duration,
) -> Vec<Arc<dyn WriteStrategy>> {
    vec![
        Arc::new(DirectWrite),
        Arc::new(AtomicRename),
        Arc::new(ElevatedShell::new(runner.clone(), command_timeout)),
        Arc::new(PrivilegedCopy::new(runner.clone(), command_timeout)),
        Arc::new(PermissionReset::new(runner, command_timeout)),
    ]
}
