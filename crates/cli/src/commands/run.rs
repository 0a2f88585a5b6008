use anyhow::Context;
use kidsafe_application::services::{AgentEvent, BackoffPolicy};
use kidsafe_domain::config::ShutdownMode;
use kidsafe_domain::Config;
use kidsafe_infrastructure::system::is_elevated;
use kidsafe_jobs::{AdaptivePollingJob, JobRunner, StatusHeartbeatJob, UsageMonitorJob};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::di::{Services, UseCases};

/// Long-running agent: apply the stored rules, start the background loops,
/// then undo the hosts changes on shutdown.
pub async fn run(config: &Config, services: &Services, use_cases: &UseCases) -> anyhow::Result<()> {
    match is_elevated() {
        Some(true) => info!("Running with elevated privileges"),
        Some(false) => warn!("Not running elevated; hosts writes will need privilege escalation"),
        None => debug!("Privilege level unknown"),
    }

    services
        .hosts
        .initialize()
        .await
        .context("Cannot start without a readable hosts file")?;

    match use_cases.apply_rules.execute().await {
        Ok(count) => info!(domains = count, "Existing block rules applied"),
        Err(e) => warn!(error = %e, "Failed to apply existing block rules"),
    }

    if config.time_limits.enabled {
        services.usage_monitor.load().await;
    }

    let shutdown = CancellationToken::new();
    spawn_event_logger(services, shutdown.clone());

    let handles = build_job_runner(config, services, use_cases)
        .with_shutdown_token(shutdown.clone())
        .start()
        .await;

    info!(
        blocked = services.hosts.blocked_count().await,
        jobs = handles.len(),
        remote_sync = use_cases.blocklist_sync.is_some(),
        "KidSafe agent started"
    );

    wait_for_shutdown_signal().await;
    info!("Shutdown signal received, stopping background jobs");

    shutdown.cancel();
    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "Background job ended abnormally");
        }
    }

    if config.time_limits.enabled {
        services.usage_monitor.shutdown().await;
    }

    let result = match config.hosts.shutdown_mode {
        ShutdownMode::Strip => services.hosts.cleanup().await,
        ShutdownMode::Restore => services.hosts.restore_original().await,
    };
    match result {
        Ok(()) => info!(
            mode = config.hosts.shutdown_mode.to_str(),
            "Hosts file released"
        ),
        Err(e) => error!(error = %e, "Failed to release hosts file on shutdown"),
    }

    info!("Agent shutdown complete");
    Ok(())
}

fn build_job_runner(config: &Config, services: &Services, use_cases: &UseCases) -> JobRunner {
    let sync = &config.sync;
    let mut runner = JobRunner::new();

    if let Some(reconciler) = &use_cases.blocklist_sync {
        runner = runner.with_blocklist_sync(AdaptivePollingJob::new(
            reconciler.clone(),
            BackoffPolicy::from_millis(
                sync.base_interval_ms,
                sync.max_interval_ms,
                sync.backoff_factor,
            ),
        ));
    }

    if let Some(report) = &use_cases.report_status {
        runner = runner.with_status_heartbeat(
            StatusHeartbeatJob::new(report.clone()).with_interval(sync.status_interval_secs),
        );
    }

    if !config.time_limits.enabled {
        return runner;
    }

    if let Some(time_rules) = &use_cases.time_rules_sync {
        runner = runner.with_time_rules_sync(AdaptivePollingJob::new(
            time_rules.clone(),
            BackoffPolicy::from_millis(
                sync.time_rules_base_interval_ms,
                sync.max_interval_ms,
                sync.time_rules_backoff_factor,
            ),
        ));
    }

    runner.with_usage_monitor(
        UsageMonitorJob::new(services.usage_monitor.clone())
            .with_interval(config.time_limits.check_interval_secs),
    )
}

fn spawn_event_logger(services: &Services, shutdown: CancellationToken) {
    let mut events = services.events.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Ok(AgentEvent::AccessChanged { blocked, reason }) => {
                        info!(blocked, reason = %reason, "Network access changed");
                    }
                    Ok(event) => debug!(?event, "Agent event"),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Event logger lagged");
                    }
                    Err(_) => break,
                },
            }
        }
    });
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
    }
}
