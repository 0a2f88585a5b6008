use kidsafe_application::ports::NetworkGate;
use kidsafe_infrastructure::system::{FirewallBackend, FirewallNetworkGate};
use std::sync::Arc;
use std::time::Duration;

mod helpers;
use helpers::*;

fn gate(runner: &MockCommandRunner, backend: FirewallBackend) -> FirewallNetworkGate {
    FirewallNetworkGate::new(Arc::new(runner.clone()), backend, Duration::from_secs(5))
}

#[test]
fn test_netsh_rules_block_outbound_web_ports() {
    let runner = MockCommandRunner::new();
    let commands = gate(&runner, FirewallBackend::Netsh).block_commands();

    assert_eq!(commands.len(), 2);
    let (program, args) = &commands[0];
    assert_eq!(*program, "netsh");
    assert!(args.contains(&"name=KidSafe Time Block HTTP".to_string()));
    assert!(args.contains(&"dir=out".to_string()));
    assert!(args.contains(&"remoteport=80".to_string()));
    assert!(commands[1].1.contains(&"remoteport=443".to_string()));
}

#[tokio::test]
async fn test_block_clears_stale_rules_first() {
    let runner = MockCommandRunner::new();
    runner.push_output(1, "No rules match").await;
    runner.push_output(1, "No rules match").await;

    gate(&runner, FirewallBackend::Netsh).block().await.unwrap();

    let calls = runner.calls().await;
    assert_eq!(calls.len(), 4);
    assert!(calls[0].1.contains(&"delete".to_string()));
    assert!(calls[2].1.contains(&"add".to_string()));
}

#[tokio::test]
async fn test_failed_add_is_an_error() {
    let runner = MockCommandRunner::new();
    runner.push_output(0, "").await;
    runner.push_output(0, "").await;
    runner.push_output(1, "The requested operation requires elevation").await;

    let result = gate(&runner, FirewallBackend::Iptables).block().await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_unblock_tolerates_missing_rules() {
    let runner = MockCommandRunner::new();
    runner.push_output(1, "Bad rule").await;
    runner.push_output(1, "Bad rule").await;

    gate(&runner, FirewallBackend::Iptables).unblock().await.unwrap();

    let calls = runner.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "iptables");
    assert_eq!(calls[0].1[0], "-D");
}
