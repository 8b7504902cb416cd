use super::*;
use crate::config::{Config, EnvironmentConfig};
use crate::hub::SnapshotHub;
use oj_ci_core::{BranchPin, Environment};
use oj_ci_orchestrator::FakeOrchestrator;
use oj_ci_scm::FakeSourceControl;

fn empty_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        peer_url: None,
        base_dir: std::env::temp_dir(),
        environments: vec![EnvironmentConfig {
            environment: Environment::new("env-1", "git@example.com:org/repo.git")
                .with_branches(vec![BranchPin::head("master")]),
            stack: "env-1-stack".to_string(),
            compose_relative_path: "docker-compose.yml".to_string(),
            vars: Default::default(),
            push: false,
            publish: false,
        }],
    }
}

#[tokio::test]
async fn status_query_returns_the_current_snapshot() {
    let config = empty_config();
    let control_loop = Arc::new(ControlLoop::new(
        &config,
        Arc::new(FakeSourceControl::new()) as Arc<dyn oj_ci_scm::SourceControlOps>,
        Arc::new(FakeOrchestrator::new()) as Arc<dyn oj_ci_orchestrator::OrchestratorOps>,
        SnapshotHub::new(),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let loop_for_server = control_loop.clone();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        handle_connection(stream, &loop_for_server).await.unwrap();
    });

    let mut client = TcpStream::connect(addr).await.unwrap();
    write_message(&mut client, &Message::StatusQuery).await.unwrap();
    let response = read_message(&mut client).await.unwrap();
    assert!(matches!(response, Message::Snapshot(_)));
}

#[tokio::test]
async fn operator_update_is_queued_for_the_next_pass() {
    let config = empty_config();
    let control_loop = Arc::new(ControlLoop::new(
        &config,
        Arc::new(FakeSourceControl::new()) as Arc<dyn oj_ci_scm::SourceControlOps>,
        Arc::new(FakeOrchestrator::new()) as Arc<dyn oj_ci_orchestrator::OrchestratorOps>,
        SnapshotHub::new(),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let loop_for_server = control_loop.clone();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        handle_connection(stream, &loop_for_server).await.unwrap();
    });

    let mut client = TcpStream::connect(addr).await.unwrap();
    write_message(
        &mut client,
        &Message::OperatorUpdate {
            id: oj_ci_core::EnvironmentId::new("env-1"),
            branches: vec![BranchPin::head("develop")],
        },
    )
    .await
    .unwrap();
    let _ack = read_message(&mut client).await.unwrap();

    control_loop.run_pass().await;
    let snapshot = control_loop.current_snapshot();
    let entry = snapshot
        .environments
        .get(&oj_ci_core::EnvironmentId::new("env-1"))
        .unwrap();
    assert_eq!(entry.env.branches, vec![("develop".to_string(), "HEAD".to_string())]);
}
