use kidsafe_application::use_cases::ReportPcStatusUseCase;
use kidsafe_jobs::StatusHeartbeatJob;
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::*;

const STATUS_PATH: &str = "kidsafe/families/fam-1/pcStatus";

#[tokio::test]
async fn test_heartbeat_writes_status_immediately() {
    let remote = Arc::new(MockRemoteStore::new());
    let hosts = hosts_blocker(Arc::new(MockHostsFile::new("127.0.0.1 localhost\n")));
    hosts.initialize().await.unwrap();
    hosts.add_domain("youtube.com").await.unwrap();

    let report = Arc::new(ReportPcStatusUseCase::new(
        remote.clone(),
        hosts,
        STATUS_PATH.to_string(),
        "0.3.2".to_string(),
    ));
    let token = CancellationToken::new();
    let job = Arc::new(
        StatusHeartbeatJob::new(report)
            .with_interval(60)
            .with_cancellation(token.clone()),
    );
    let handle = tokio::spawn(job.start());
    sleep(Duration::from_millis(30)).await;
    token.cancel();
    timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();

    let written = remote.written(STATUS_PATH).await.expect("status not written");
    assert_eq!(written["status"], "connected");
    assert_eq!(written["version"], "0.3.2");
    assert_eq!(written["hostFileStatus"], "active");
    assert_eq!(written["blockedCount"], 1);
    assert_eq!(remote.set_calls(), 1);
}

#[tokio::test]
async fn test_heartbeat_survives_remote_failure() {
    let remote = Arc::new(MockRemoteStore::new());
    remote.set_should_fail(true);
    let hosts = hosts_blocker(Arc::new(MockHostsFile::new("")));

    let report = Arc::new(ReportPcStatusUseCase::new(
        remote.clone(),
        hosts,
        STATUS_PATH.to_string(),
        "0.3.2".to_string(),
    ));
    let token = CancellationToken::new();
    let job = Arc::new(StatusHeartbeatJob::new(report).with_cancellation(token.clone()));
    let handle = tokio::spawn(job.start());
    sleep(Duration::from_millis(20)).await;

    assert!(!handle.is_finished());
    token.cancel();
    handle.await.unwrap();
    assert_eq!(remote.set_calls(), 1);
    assert!(remote.written(STATUS_PATH).await.is_none());
}
